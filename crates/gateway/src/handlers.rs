use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use shared_types::EventKind;
use std::fmt;

use crate::analytics::RequestMeta;
use crate::error::GatewayError;
use crate::pages::{self, LoginView};
use crate::{site, AppState};

const UNKNOWN_LINK: &str = "This link is invalid or has been removed.";

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Render the empty login form.
pub async fn login_form(State(state): State<AppState>) -> Html<String> {
    let site = site::load(&state.config.site_config_file).await;
    Html(pages::login_page(&LoginView {
        site,
        ..Default::default()
    }))
}

/// Redeem a shareable link: log the visit and render the prefilled form.
pub async fn token_visit(
    State(state): State<AppState>,
    Path(token): Path<String>,
    meta: RequestMeta,
) -> Response {
    let lookup = state.tokens.lookup(&token).await;
    let email = lookup.as_ref().ok().cloned();

    state
        .analytics
        .record(
            meta.event(EventKind::TokenVisit)
                .with_token(token.as_str())
                .with_email(email.clone()),
        )
        .await;

    let site = site::load(&state.config.site_config_file).await;
    match lookup {
        Ok(email) => Html(pages::login_page(&LoginView {
            prefill_email: &email,
            site,
            ..Default::default()
        }))
        .into_response(),
        Err(GatewayError::TokenNotFound) => {
            tracing::info!("Visit to unknown link token");
            (
                StatusCode::NOT_FOUND,
                Html(pages::login_page(&LoginView {
                    error: Some(UNKNOWN_LINK),
                    site,
                    ..Default::default()
                })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Handle a login submission.
///
/// Invalid input re-renders the form with 400, rejected credentials with
/// 401. On success the user is sent to the external site with a signed
/// assertion; if no assertion can be signed nothing is issued.
pub async fn login_submit(
    State(state): State<AppState>,
    meta: RequestMeta,
    Form(form): Form<LoginForm>,
) -> Response {
    let email = form.email.trim().to_string();

    if let Err(e) = validate_input(&state, &email, &form.password) {
        let reason = e.to_string();
        state
            .analytics
            .record(
                meta.event(EventKind::LoginInvalidInput)
                    .with_email(Some(email.clone()).filter(|v| !v.is_empty()))
                    .with_reason(reason.as_str()),
            )
            .await;
        return render_form_error(&state, e.status(), &email, &reason).await;
    }

    if !state.verifier.verify(&email, &form.password) {
        tracing::info!("Rejected credentials for {}", email);
        state
            .analytics
            .record(meta.event(EventKind::LoginFailed).with_email(Some(email.clone())))
            .await;
        let e = GatewayError::VerificationFailed;
        return render_form_error(&state, e.status(), &email, &e.to_string()).await;
    }

    match state.issuer.redirect_url(&email) {
        Ok(url) => {
            tracing::info!("Successful login for {}", email);
            state
                .analytics
                .record(meta.event(EventKind::LoginSuccess).with_email(Some(email)))
                .await;
            Redirect::to(&url).into_response()
        }
        Err(e) => {
            tracing::error!("Could not issue assertion for {}: {}", email, e);
            e.into_response()
        }
    }
}

fn validate_input(state: &AppState, email: &str, password: &str) -> Result<(), GatewayError> {
    if email.is_empty() {
        return Err(GatewayError::MissingCredentials(
            "Email is required.".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(GatewayError::MissingCredentials(
            "Password is required.".to_string(),
        ));
    }
    state.email_policy.validate(email)
}

async fn render_form_error(
    state: &AppState,
    status: StatusCode,
    email: &str,
    message: &str,
) -> Response {
    let site = site::load(&state.config.site_config_file).await;
    (
        status,
        Html(pages::login_page(&LoginView {
            prefill_email: email,
            error: Some(message),
            site,
        })),
    )
        .into_response()
}
