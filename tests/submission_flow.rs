//! End-to-end: answer a wizard, submit it over HTTP, read the record back.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::time::timeout;

use sewna::api::{AppState, routes};
use sewna::gateway::{FollowUp, FormKind, HttpGateway, SubmissionSession};
use sewna::oauth::OAuthService;
use sewna::profile::{ProfileEditor, ViewFlags};
use sewna::store::models::ClientType;
use sewna::store::{Database, LibSqlBackend};
use sewna::wizard::AnswerValue;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn start_server() -> (String, Arc<dyn Database>) {
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let app = routes(AppState::new(
        Arc::clone(&db),
        OAuthService::new("http://localhost"),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), db)
}

#[tokio::test]
async fn client_wizard_round_trip() {
    timeout(TEST_TIMEOUT, async {
        let (base, db) = start_server().await;
        let gateway = HttpGateway::new(&base);

        let mut session = SubmissionSession::new(FormKind::Client);
        {
            let wizard = session.wizard_mut().unwrap();
            wizard.advance("Ada Lovelace").unwrap();
            wizard.advance("ada@example.com").unwrap();
            wizard.advance("individual").unwrap();
            assert_eq!(wizard.current_question().unwrap().id, "lookingFor");
            wizard.advance("A logo").unwrap();
            wizard.advance("For a small bakery").unwrap();
            wizard.advance("Less than $1,000").unwrap();
            wizard.advance("1 month").unwrap();
            wizard
                .add_attachments(vec!["data:image/png;base64,iVBORw0KGgo=".into()])
                .unwrap();
            wizard.proceed().unwrap();
            assert!(wizard.is_complete());
        }

        let follow_up = session.submit(&gateway).await.unwrap();
        let FollowUp::FindDesigners { client_id } = follow_up else {
            panic!("unexpected follow-up {follow_up:?}");
        };

        let client = db.get_client(client_id).await.unwrap().unwrap();
        assert_eq!(client.full_name, "Ada Lovelace");
        assert_eq!(client.client_type, ClientType::Individual);
        assert!(client.business_name.is_none());
        assert_eq!(client.inspiration_images.len(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn designer_wizard_then_profile_editor() {
    timeout(TEST_TIMEOUT, async {
        let (base, db) = start_server().await;
        let gateway = HttpGateway::new(&base);

        let mut session = SubmissionSession::new(FormKind::Designer);
        {
            let wizard = session.wizard_mut().unwrap();
            for answer in [
                "Grace Hopper",
                "grace@example.com",
                "+1 555 0100",
                "USA",
                "7",
                "Branding",
            ] {
                wizard.advance(answer).unwrap();
            }
        }

        let follow_up = session.submit(&gateway).await.unwrap();
        assert_eq!(follow_up.location(), "/portfolio?name=Grace+Hopper");
        let FollowUp::Portfolio { designer_id, .. } = follow_up else {
            panic!("unexpected follow-up {follow_up:?}");
        };

        let mut editor = ProfileEditor::open(db.as_ref(), designer_id, ViewFlags::default())
            .await
            .unwrap();
        assert_eq!(editor.form().years_of_experience, "7");
        editor.form_mut().bio = "Compilers and typography".into();
        editor.save(db.as_ref()).await.unwrap();

        let portfolio = db.get_portfolio(designer_id).await.unwrap().unwrap();
        assert_eq!(portfolio.bio.as_deref(), Some("Compilers and typography"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn server_rejection_keeps_answers() {
    timeout(TEST_TIMEOUT, async {
        let (base, _db) = start_server().await;
        let gateway = HttpGateway::new(&base);

        let fill = |session: &mut SubmissionSession| {
            let wizard = session.wizard_mut().unwrap();
            wizard.advance("Grace").unwrap();
            wizard.advance("grace@example.com").unwrap();
            while !wizard.is_complete() {
                wizard.advance("1").unwrap();
            }
        };

        // The second designer with the same email hits the unique
        // constraint on the server.
        let mut first = SubmissionSession::new(FormKind::Designer);
        fill(&mut first);
        first.submit(&gateway).await.unwrap();

        let mut second = SubmissionSession::new(FormKind::Designer);
        fill(&mut second);
        let before = second.wizard().answers().clone();
        let err = second.submit(&gateway).await.unwrap_err();
        assert!(matches!(err, sewna::error::SubmissionError::Server { status: 500, .. }));
        assert_eq!(second.wizard().answers(), &before);
        assert_eq!(
            second.wizard().answers().get("email"),
            Some(&AnswerValue::from("grace@example.com"))
        );
        assert!(second.can_submit());
    })
    .await
    .expect("test timed out");
}
