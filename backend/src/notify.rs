use std::str::FromStr;

use anyhow::{Context, Result};
use folio_shared::NewTestimonial;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use crate::config::{NotificationConfig, SmtpConfig};

/// Tells the site owner a new testimonial is waiting for review.
#[derive(Clone)]
pub struct SubmissionNotifier {
    recipient: Mailbox,
    delivery: Delivery,
}

#[derive(Clone)]
enum Delivery {
    Smtp {
        from_mailbox: Mailbox,
        mailer: AsyncSmtpTransport<Tokio1Executor>,
    },
    LogOnly,
}

impl SubmissionNotifier {
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let recipient = Mailbox::from_str(config.recipient.trim())
            .with_context(|| format!("invalid NOTIFICATION_EMAIL: {}", config.recipient))?;
        let delivery = match &config.smtp {
            Some(smtp) => build_smtp(smtp)?,
            None => {
                tracing::warn!("SMTP credentials not set; new testimonials will only be logged");
                Delivery::LogOnly
            },
        };
        Ok(Self {
            recipient,
            delivery,
        })
    }

    pub async fn notify_new_submission(&self, row: &NewTestimonial, record_id: &str) -> Result<()> {
        let (subject, body) = submission_email(row, record_id);
        match &self.delivery {
            Delivery::LogOnly => {
                tracing::info!(
                    "new testimonial {record_id} from {} awaiting review (notification for {})",
                    row.name,
                    self.recipient
                );
                Ok(())
            },
            Delivery::Smtp {
                from_mailbox,
                mailer,
            } => {
                let email = Message::builder()
                    .from(from_mailbox.clone())
                    .to(self.recipient.clone())
                    .subject(subject)
                    .body(body)
                    .context("failed to build email message")?;
                mailer
                    .send(email)
                    .await
                    .context("failed to send email via SMTP")?;
                Ok(())
            },
        }
    }

    /// Send in the background; the outcome is only logged.
    pub fn spawn_notify(&self, row: NewTestimonial, record_id: String) {
        let notifier = self.clone();
        tokio::spawn(async move {
            if let Err(err) = notifier.notify_new_submission(&row, &record_id).await {
                tracing::warn!("failed to send testimonial notification for {record_id}: {err:#}");
            }
        });
    }
}

fn build_smtp(config: &SmtpConfig) -> Result<Delivery> {
    let sender = config.username.trim();
    let from_mailbox = Mailbox::from_str(&format!("{} <{sender}>", config.from_name))
        .context("invalid sender mailbox")?;
    let password: String = config
        .password
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    let credentials = Credentials::new(sender.to_string(), password);
    let builder = if config.port == 465 {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .with_context(|| format!("invalid smtp relay host: {}", config.host))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("invalid smtp starttls host: {}", config.host))?
    };
    let mailer = builder.port(config.port).credentials(credentials).build();
    tracing::info!("testimonial notifications enabled via {}:{}", config.host, config.port);
    Ok(Delivery::Smtp {
        from_mailbox,
        mailer,
    })
}

pub fn submission_email(row: &NewTestimonial, record_id: &str) -> (String, String) {
    let subject = format!("New testimonial from {}", row.name);
    let body = format!(
        "A new testimonial is waiting for review.\n\nRecord ID: {record_id}\nName: {}\nEmail: \
         {}\nCompany/Title: {}\nRating: {}/5\n\nMessage:\n{}\n",
        row.name, row.email, row.company, row.rating, row.message
    );
    (subject, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> NewTestimonial {
        NewTestimonial {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            company: "Engines Ltd".to_string(),
            message: "Precise, fast and thoughtful.".to_string(),
            rating: 5,
        }
    }

    #[test]
    fn email_lists_every_cell() {
        let (subject, body) = submission_email(&row(), "recABC");
        assert_eq!(subject, "New testimonial from Ada");
        assert!(body.contains("Record ID: recABC"));
        assert!(body.contains("Email: ada@example.com"));
        assert!(body.contains("Company/Title: Engines Ltd"));
        assert!(body.contains("Rating: 5/5"));
        assert!(body.ends_with("Precise, fast and thoughtful.\n"));
    }

    #[tokio::test]
    async fn log_only_delivery_succeeds() {
        let notifier = SubmissionNotifier::from_config(&NotificationConfig {
            recipient: "owner@example.com".to_string(),
            smtp: None,
        })
        .expect("notifier");
        notifier
            .notify_new_submission(&row(), "recABC")
            .await
            .expect("logged");
    }

    #[tokio::test]
    async fn unreachable_smtp_relay_reports_an_error() {
        let notifier = SubmissionNotifier::from_config(&NotificationConfig {
            recipient: "owner@example.com".to_string(),
            smtp: Some(SmtpConfig {
                host: "127.0.0.1".to_string(),
                port: 1,
                username: "sender@example.com".to_string(),
                password: "app password".to_string(),
                from_name: "Portfolio".to_string(),
            }),
        })
        .expect("notifier");
        let result = notifier.notify_new_submission(&row(), "recABC").await;
        assert!(result.is_err());
    }

    #[test]
    fn bad_recipient_is_rejected() {
        let result = SubmissionNotifier::from_config(&NotificationConfig {
            recipient: "not an address".to_string(),
            smtp: None,
        });
        assert!(result.is_err());
    }
}
