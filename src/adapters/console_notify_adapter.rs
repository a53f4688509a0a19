//! Console notification adapter.
//!
//! Stands in for the real notification channel: prints to stdout, addressed
//! by channel id so output matches what a chat transport would receive.

use crate::domain::error::LaddersimError;
use crate::domain::user::User;
use crate::ports::notify_port::NotifyPort;

pub struct ConsoleNotifyAdapter;

impl NotifyPort for ConsoleNotifyAdapter {
    fn send(&self, user: &User, text: &str) -> Result<(), LaddersimError> {
        println!("[{}] {text}", user.channel_id);
        Ok(())
    }
}
