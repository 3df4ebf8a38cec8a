//! The two intake question sets.

use super::question::{InputKind, QuestionDefinition};

/// Question ids for the client intake.
pub mod client {
    pub const FULL_NAME: &str = "fullName";
    pub const EMAIL: &str = "email";
    pub const CLIENT_TYPE: &str = "clientType";
    pub const BUSINESS_NAME: &str = "businessName";
    pub const LOOKING_FOR: &str = "lookingFor";
    pub const PROJECT_DESCRIPTION: &str = "projectDescription";
    pub const BUDGET_RANGE: &str = "budgetRange";
    pub const TIMELINE: &str = "timeline";
    pub const INSPIRATION_IMAGES: &str = "inspirationImages";
}

/// Question ids for the designer intake.
pub mod designer {
    pub const FULL_NAME: &str = "fullName";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const COUNTRY: &str = "country";
    pub const YEARS_OF_EXPERIENCE: &str = "yearsOfExperience";
    pub const DESIGN_AREAS: &str = "designAreas";
}

pub const BUDGET_RANGES: [&str; 5] = [
    "Less than $1,000",
    "$1,000 - $5,000",
    "$5,000 - $10,000",
    "$10,000 - $25,000",
    "More than $25,000",
];

pub const TIMELINES: [&str; 5] = [
    "ASAP (within 2 weeks)",
    "1 month",
    "2-3 months",
    "3-6 months",
    "Flexible",
];

const ANSWER_PLACEHOLDER: &str = "Type your answer here...";

/// Questions asked of a client looking for a designer.
pub fn client_questions() -> Vec<QuestionDefinition> {
    vec![
        QuestionDefinition::new(client::FULL_NAME, "What is your full name?", InputKind::Text)
            .with_placeholder(ANSWER_PLACEHOLDER),
        QuestionDefinition::new(client::EMAIL, "What is your email address?", InputKind::Email)
            .with_placeholder("name@example.com"),
        QuestionDefinition::new(
            client::CLIENT_TYPE,
            "Are you a business or an individual?",
            InputKind::Choice,
        )
        .with_choices(["business", "individual"]),
        QuestionDefinition::new(client::BUSINESS_NAME, "What is your business name?", InputKind::Text)
            .with_placeholder(ANSWER_PLACEHOLDER)
            .visible_when(client::CLIENT_TYPE, "business"),
        QuestionDefinition::new(client::LOOKING_FOR, "What are you looking for?", InputKind::LongText)
            .with_placeholder("e.g., Logo design, Website redesign, Brand identity..."),
        QuestionDefinition::new(
            client::PROJECT_DESCRIPTION,
            "Tell us more about your project",
            InputKind::LongText,
        )
        .with_placeholder("Describe your vision, goals, and any specific requirements..."),
        QuestionDefinition::new(client::BUDGET_RANGE, "What is your budget range?", InputKind::Choice)
            .with_choices(BUDGET_RANGES),
        QuestionDefinition::new(client::TIMELINE, "What is your timeline?", InputKind::Choice)
            .with_choices(TIMELINES),
        QuestionDefinition::new(
            client::INSPIRATION_IMAGES,
            "Do you have any design inspiration to share?",
            InputKind::File,
        )
        .with_placeholder("Upload images or examples that inspire you (optional)"),
    ]
}

/// Questions asked of a designer joining the platform.
pub fn designer_questions() -> Vec<QuestionDefinition> {
    vec![
        QuestionDefinition::new(designer::FULL_NAME, "What is your full name?", InputKind::Text)
            .with_placeholder(ANSWER_PLACEHOLDER),
        QuestionDefinition::new(designer::EMAIL, "What is your email address?", InputKind::Email)
            .with_placeholder("name@example.com"),
        QuestionDefinition::new(designer::PHONE, "Could you share your phone number?", InputKind::Phone)
            .with_placeholder("+1 (555) 000-0000"),
        QuestionDefinition::new(
            designer::COUNTRY,
            "Which country do you currently reside in?",
            InputKind::Text,
        )
        .with_placeholder(ANSWER_PLACEHOLDER),
        QuestionDefinition::new(
            designer::YEARS_OF_EXPERIENCE,
            "How many years have you worked as a designer?",
            InputKind::Number,
        )
        .with_placeholder("e.g., 5"),
        QuestionDefinition::new(
            designer::DESIGN_AREAS,
            "Which areas of design do you specialize in?",
            InputKind::Text,
        )
        .with_placeholder("e.g., Branding, UI/UX, Illustration..."),
    ]
}
