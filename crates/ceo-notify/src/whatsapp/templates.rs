//! Plain-text WhatsApp message templates.

/// Sent after a number is confirmed.
pub fn welcome(name: &str) -> String {
    format!("Welcome to CEO, {name}! 👋\n\nYou're now connected to receive important updates and reminders via WhatsApp.")
}

pub fn reminder(task_name: &str, due_date: &str, description: &str) -> String {
    format!("🔔 Reminder: {task_name}\n\nDue: {due_date}\n{description}")
}

pub fn announcement(sender_name: &str, message: &str) -> String {
    format!("📢 Announcement from {sender_name}\n\n{message}")
}

pub fn report_due(report_name: &str, due_date: &str) -> String {
    format!("📊 Report Due: {report_name}\n\nDeadline: {due_date}\nPlease submit your report through the CEO platform.")
}

pub fn verification_code(code: &str) -> String {
    format!("Your CEO verification code is: {code}")
}

/// Body of a broadcast notification: bold title, blank line, content.
pub fn notification(title: &str, content: &str) -> String {
    format!("*{title}*\n\n{content}")
}
