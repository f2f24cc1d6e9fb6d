//! Application transcript handlers.
//!
//! ```text
//! POST /api/v1/applications/{id}/messages {"content":"When can we meet?"}
//! GET  /api/v1/applications/{id}/messages
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SendMessageRequest;
use crate::domain::{ApplicationId, Error, Message, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Message body for `POST /api/v1/applications/{id}/messages`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest {
    #[schema(example = "When can we meet?")]
    pub content: String,
    /// Optional; when given it must name the other party.
    #[schema(value_type = Option<String>, format = Uuid)]
    pub receiver_id: Option<String>,
}

/// Send a message to the other party of an accepted application.
#[utoipa::path(
    post,
    path = "/api/v1/applications/{id}/messages",
    params(("id" = String, Path, description = "Application identifier")),
    request_body = MessageRequest,
    responses(
        (status = 201, description = "Message stored", body = Message),
        (status = 400, description = "Blank, oversized or misaddressed message", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not a party", body = Error),
        (status = 404, description = "No such application", body = Error),
        (status = 409, description = "Application not accepted", body = Error)
    ),
    tags = ["messages"],
    operation_id = "sendMessage"
)]
#[post("/applications/{id}/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<MessageRequest>,
) -> ApiResult<HttpResponse> {
    let sender_id = session.require_user_id()?;
    let application_id: ApplicationId = parse_id(&path, FieldName::new("id"))?;
    let MessageRequest {
        content,
        receiver_id,
    } = payload.into_inner();
    let receiver_id = receiver_id
        .map(|raw| parse_id::<UserId>(&raw, FieldName::new("receiverId")))
        .transpose()?;
    let message = state
        .message_command
        .send(SendMessageRequest {
            application_id,
            sender_id,
            receiver_id,
            content,
        })
        .await?;
    Ok(HttpResponse::Created().json(message))
}

/// Transcript of an application in send order.
#[utoipa::path(
    get,
    path = "/api/v1/applications/{id}/messages",
    params(("id" = String, Path, description = "Application identifier")),
    responses(
        (status = 200, description = "Transcript", body = [Message]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not a party", body = Error),
        (status = 404, description = "No such application", body = Error)
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/applications/{id}/messages")]
pub async fn list_messages(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Message>>> {
    let caller = session.require_user_id()?;
    let application_id: ApplicationId = parse_id(&path, FieldName::new("id"))?;
    Ok(web::Json(
        state.messages.transcript(&application_id, &caller).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageId;
    use crate::inbound::http::state::fixtures::MockPorts;
    use crate::inbound::http::test_utils::{error_code, login_cookie, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn stored(request: &SendMessageRequest, receiver: UserId) -> Message {
        Message {
            id: MessageId::random(),
            application_id: request.application_id,
            sender_id: request.sender_id,
            receiver_id: receiver,
            content: request.content.trim().to_owned(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).single().expect("valid time"),
        }
    }

    #[actix_web::test]
    async fn sending_forwards_the_caller_as_sender() {
        let sender = UserId::random();
        let receiver = UserId::random();
        let mut ports = MockPorts::default();
        ports
            .message_command
            .expect_send()
            .withf(move |request| {
                request.sender_id == sender && request.receiver_id == Some(receiver)
            })
            .times(1)
            .returning(move |request| Ok(stored(&request, receiver)));
        let app = test::init_service(test_app(ports.into())).await;
        let cookie = login_cookie(&app, &sender).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/applications/{}/messages", ApplicationId::random()))
                .cookie(cookie)
                .set_json(json!({ "content": "Hello", "receiverId": receiver.to_string() }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["receiverId"], receiver.to_string());
        assert_eq!(body["content"], "Hello");
    }

    #[actix_web::test]
    async fn malformed_receivers_are_bad_requests() {
        let mut ports = MockPorts::default();
        ports.message_command.expect_send().never();
        let app = test::init_service(test_app(ports.into())).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/applications/{}/messages", ApplicationId::random()))
                .cookie(cookie)
                .set_json(json!({ "content": "Hello", "receiverId": "bob" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "receiverId");
    }

    #[actix_web::test]
    async fn messaging_a_pending_application_conflicts() {
        let mut ports = MockPorts::default();
        ports.message_command.expect_send().returning(|_| {
            Err(Error::invalid_state(
                "messages can only be sent on accepted applications",
            ))
        });
        let app = test::init_service(test_app(ports.into())).await;
        let cookie = login_cookie(&app, &UserId::random()).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/applications/{}/messages", ApplicationId::random()))
                .cookie(cookie)
                .set_json(json!({ "content": "Hello" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(error_code(res).await, "invalid_state");
    }

    #[actix_web::test]
    async fn transcripts_are_read_as_the_caller() {
        let caller = UserId::random();
        let application = ApplicationId::random();
        let mut ports = MockPorts::default();
        ports
            .messages
            .expect_transcript()
            .withf(move |id, by| *id == application && *by == caller)
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let app = test::init_service(test_app(ports.into())).await;
        let cookie = login_cookie(&app, &caller).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/applications/{application}/messages"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
