//! Email delivery via SMTP.
//!
//! [`EmailChannel`] wraps the `lettre` async SMTP transport. Subject and
//! body come from the host's [`TemplateRenderer`] using the template ids
//! `{notification}_email_subject`, `{notification}_email_body` and
//! `{notification}_email_html`. A missing HTML template degrades to a
//! plain-text send; a missing subject or body template is a delivery
//! failure. Per the channel contract every failure mode is caught here and
//! reduced to `false`.

use std::sync::Arc;

use lettre::message::{header::ContentType, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::channel::{ChannelHandler, DeliveryRequest};
use crate::template::{TemplateError, TemplateRenderer};

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@courier.local";

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Configuration for the SMTP email channel.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that the email
    /// channel is not configured and should not be registered.
    ///
    /// | Variable        | Required | Default                 |
    /// |-----------------|----------|-------------------------|
    /// | `SMTP_HOST`     | yes      | —                       |
    /// | `SMTP_PORT`     | no       | `587`                   |
    /// | `SMTP_FROM`     | no       | `noreply@courier.local` |
    /// | `SMTP_USER`     | no       | —                       |
    /// | `SMTP_PASSWORD` | no       | —                       |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// EmailChannel
// ---------------------------------------------------------------------------

/// SMTP delivery channel.
pub struct EmailChannel {
    config: EmailConfig,
    renderer: Arc<dyn TemplateRenderer>,
}

impl EmailChannel {
    pub fn new(config: EmailConfig, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { config, renderer }
    }

    /// Assemble the render context: caller-supplied context merged with the
    /// recipient and message fields.
    fn render_context(request: &DeliveryRequest<'_>) -> serde_json::Value {
        let mut context = match request.context {
            Some(serde_json::Value::Object(map)) => serde_json::Value::Object(map.clone()),
            _ => serde_json::json!({}),
        };
        context["user"] = serde_json::json!({
            "id": request.user.id,
            "username": request.user.username,
            "email": request.user.email,
        });
        context["message"] = serde_json::Value::String(request.message.to_string());
        if let Some(path) = request.path {
            context["path"] = serde_json::Value::String(path.to_string());
        }
        context
    }

    /// Render subject/body/html and assemble the MIME message.
    ///
    /// Returns `None` (after logging) when a required template is missing,
    /// the address cannot be parsed, or the message cannot be built.
    fn build_message(&self, request: &DeliveryRequest<'_>, to_email: &str) -> Option<Message> {
        let notification = &request.notification.name;
        let context = Self::render_context(request);

        let subject = match self
            .renderer
            .render(&format!("{notification}_email_subject"), &context)
        {
            // Subjects must be a single line.
            Ok(s) => s.lines().collect::<String>(),
            Err(e) => {
                tracing::warn!(notification = %notification, error = %e, "Email subject template unavailable");
                return None;
            }
        };

        let text = match self
            .renderer
            .render(&format!("{notification}_email_body"), &context)
        {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(notification = %notification, error = %e, "Email body template unavailable");
                return None;
            }
        };

        let builder = Message::builder()
            .from(match self.config.from_address.parse() {
                Ok(from) => from,
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid sender address");
                    return None;
                }
            })
            .to(match to_email.parse() {
                Ok(to) => to,
                Err(e) => {
                    tracing::warn!(to = to_email, error = %e, "Invalid recipient address");
                    return None;
                }
            })
            .subject(subject);

        // HTML is optional: missing template degrades to text-only.
        let result = match self
            .renderer
            .render(&format!("{notification}_email_html"), &context)
        {
            Ok(html) => builder.multipart(MultiPart::alternative_plain_html(text, html)),
            Err(TemplateError::NotFound(_)) => {
                builder.header(ContentType::TEXT_PLAIN).body(text)
            }
            Err(e) => {
                tracing::warn!(notification = %notification, error = %e, "Email HTML template failed, sending text only");
                builder.header(ContentType::TEXT_PLAIN).body(text)
            }
        };

        match result {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to assemble email message");
                None
            }
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, lettre::transport::smtp::Error> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait::async_trait]
impl ChannelHandler for EmailChannel {
    fn name(&self) -> &'static str {
        courier_core::channels::CHANNEL_EMAIL
    }

    fn display_name(&self) -> &'static str {
        "Email"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Send via email")
    }

    async fn deliver(&self, request: &DeliveryRequest<'_>) -> bool {
        let Some(to_email) = request.user.email.as_deref() else {
            tracing::warn!(user_id = request.user.id, "Recipient has no email address");
            return false;
        };

        let Some(message) = self.build_message(request, to_email) else {
            return false;
        };

        let mailer = match self.transport() {
            Ok(mailer) => mailer,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build SMTP transport");
                return false;
            }
        };

        match mailer.send(message).await {
            Ok(_) => {
                tracing::info!(
                    to = to_email,
                    notification = %request.notification.name,
                    "Notification email sent"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    to = to_email,
                    notification = %request.notification.name,
                    error = %e,
                    "Email delivery failed"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::StaticTemplates;
    use courier_core::types::Timestamp;
    use courier_db::models::identity::User;
    use courier_db::models::notification::Notification;

    fn now() -> Timestamp {
        chrono::Utc::now()
    }

    fn test_user(email: Option<&str>) -> User {
        User {
            id: 1,
            username: "alice".into(),
            email: email.map(String::from),
            is_active: true,
            created_at: now(),
        }
    }

    fn test_notification() -> Notification {
        Notification {
            id: 1,
            name: "welcome".into(),
            display_name: "Welcome".into(),
            is_public: true,
            default_notify: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn channel(renderer: StaticTemplates) -> EmailChannel {
        EmailChannel::new(
            EmailConfig {
                smtp_host: "localhost".into(),
                smtp_port: DEFAULT_SMTP_PORT,
                from_address: "noreply@example.com".into(),
                smtp_user: None,
                smtp_password: None,
            },
            Arc::new(renderer),
        )
    }

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[test]
    fn build_message_requires_subject_and_body_templates() {
        let user = test_user(Some("alice@example.com"));
        let notification = test_notification();
        let request = DeliveryRequest {
            user: &user,
            notification: &notification,
            message: "Welcome",
            path: None,
            context: None,
        };

        // No templates registered at all: no message.
        let ch = channel(StaticTemplates::new());
        assert!(ch.build_message(&request, "alice@example.com").is_none());

        // Subject but no body: still no message.
        let ch = channel(StaticTemplates::new().with_template("welcome_email_subject", "Hi"));
        assert!(ch.build_message(&request, "alice@example.com").is_none());

        // Subject and body, HTML missing: degrades to plain text.
        let ch = channel(
            StaticTemplates::new()
                .with_template("welcome_email_subject", "Hi")
                .with_template("welcome_email_body", "Welcome aboard"),
        );
        assert!(ch.build_message(&request, "alice@example.com").is_some());
    }

    #[test]
    fn subject_is_flattened_to_one_line() {
        let user = test_user(Some("alice@example.com"));
        let notification = test_notification();
        let request = DeliveryRequest {
            user: &user,
            notification: &notification,
            message: "Welcome",
            path: None,
            context: None,
        };

        let ch = channel(
            StaticTemplates::new()
                .with_template("welcome_email_subject", "Hello\nWorld")
                .with_template("welcome_email_body", "body"),
        );
        let message = ch.build_message(&request, "alice@example.com").unwrap();
        let encoded = String::from_utf8(message.formatted()).unwrap();
        assert!(encoded.contains("Subject: HelloWorld"));
    }

    #[tokio::test]
    async fn deliver_fails_without_recipient_address() {
        let user = test_user(None);
        let notification = test_notification();
        let request = DeliveryRequest {
            user: &user,
            notification: &notification,
            message: "Welcome",
            path: None,
            context: None,
        };

        let ch = channel(
            StaticTemplates::new()
                .with_template("welcome_email_subject", "Hi")
                .with_template("welcome_email_body", "body"),
        );
        assert!(!ch.deliver(&request).await);
    }
}
