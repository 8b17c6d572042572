use anyhow::Context;
use axum::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::SmtpConfig;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(cfg: &SmtpConfig) -> anyhow::Result<Self> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)
            .context("smtp relay")?
            .port(cfg.port)
            .credentials(Credentials::new(
                cfg.username.clone(),
                cfg.password.clone(),
            ))
            .build();
        Ok(Self {
            mailer,
            from: cfg.from.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.parse().context("parse from address")?)
            .to(to.parse().context("parse to address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .context("build email")?;
        self.mailer.send(message).await.context("smtp send")?;
        Ok(())
    }
}

/// Fallback when SMTP is not configured: logs the mail instead of sending.
#[derive(Clone)]
pub struct LogMailer;

#[async_trait]
impl EmailSender for LogMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> anyhow::Result<()> {
        info!(%to, %subject, "email dispatch skipped (smtp not configured)");
        Ok(())
    }
}

pub fn verification_email(link: &str) -> (String, String) {
    let subject = "Verifique seu email - Anonimax".to_string();
    let html = format!(
        r#"<html><body style="font-family: Arial, sans-serif;">
<h2>Verifique seu email</h2>
<p>Clique no link abaixo para verificar seu email e ativar sua conta Anonimax.</p>
<p><a href="{link}">Verificar Email</a></p>
<p>Se você não criou uma conta no Anonimax, ignore este email.</p>
</body></html>"#
    );
    (subject, html)
}

pub fn reset_password_email(link: &str) -> (String, String) {
    let subject = "Redefinição de senha - Anonimax".to_string();
    let html = format!(
        r#"<html><body style="font-family: Arial, sans-serif;">
<h2>Redefinir senha</h2>
<p>Recebemos um pedido para redefinir sua senha. O link expira em 1 hora.</p>
<p><a href="{link}">Redefinir Senha</a></p>
<p>Se você não pediu a redefinição, ignore este email.</p>
</body></html>"#
    );
    (subject, html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer;
        mailer
            .send("someone@example.com", "Assunto", "<p>oi</p>")
            .await
            .expect("log mailer should not fail");
    }

    #[test]
    fn verification_email_embeds_link() {
        let (subject, html) = verification_email("https://anonimax.com/verify?token=abc");
        assert!(subject.contains("Verifique"));
        assert!(html.contains("https://anonimax.com/verify?token=abc"));
    }

    #[test]
    fn reset_email_embeds_link() {
        let (_, html) = reset_password_email("https://anonimax.com/reset-password?token=xyz");
        assert!(html.contains("reset-password?token=xyz"));
    }
}
