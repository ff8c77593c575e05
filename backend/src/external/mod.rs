//! External API integrations

pub mod mail_functions;

pub use mail_functions::{DisabledMailer, MailFunctionsClient, MailMessage, MailSender};
