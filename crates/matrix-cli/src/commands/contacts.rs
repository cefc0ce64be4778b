use anyhow::Result;
use chrono::{NaiveTime, Timelike};
use matrix_core::Config;
use matrix_skills::{MessageSender, SystemLauncher};

pub fn list_contacts(config: &Config) -> Result<()> {
    let sender = MessageSender::load(&config.contacts_file);
    let names = sender.list_contacts();

    if names.is_empty() {
        println!("No saved contacts.");
        println!("\nAdd one with: matrix contacts add NAME +PHONE");
        return Ok(());
    }

    println!("\nContacts ({})\n", names.len());
    for name in names {
        if let Some(contact) = sender.get_contact(name) {
            match &contact.email {
                Some(email) => println!("  {:<20} {:<16} {email}", contact.name, contact.phone),
                None => println!("  {:<20} {}", contact.name, contact.phone),
            }
        }
    }
    Ok(())
}

pub fn add_contact(config: &Config, name: &str, phone: &str, email: Option<&str>) -> Result<()> {
    let mut sender = MessageSender::load(&config.contacts_file);
    let contact = sender
        .add_contact(name, phone, email)
        .map_err(|e| anyhow::anyhow!(e.reply()))?;

    println!("✓ Added {} ({})", contact.name, contact.phone);
    println!("  in {}", config.contacts_file.display());
    Ok(())
}

/// Parse `HH:MM` into an hour and minute.
pub fn parse_clock(text: &str) -> Result<(u32, u32), String> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .map(|time| (time.hour(), time.minute()))
        .map_err(|_| format!("'{text}' is not a time like 18:30"))
}

pub async fn send_message(
    config: &Config,
    name: &str,
    message: &str,
    at: Option<(u32, u32)>,
) -> Result<()> {
    let mut sender = MessageSender::load(&config.contacts_file);
    let reply = match at {
        Some((hour, minute)) => {
            println!("Waiting until {hour:02}:{minute:02} to send (Ctrl-C to cancel)...");
            sender
                .schedule_to_contact(&mut SystemLauncher, name, message, hour, minute)
                .await
        }
        None => sender.send_to_contact(&mut SystemLauncher, name, message),
    }
    .map_err(|e| anyhow::anyhow!(e.reply()))?;

    println!("✓ {reply}");
    Ok(())
}

pub fn send_group(config: &Config, group: &str, message: &str) -> Result<()> {
    let mut sender = MessageSender::load(&config.contacts_file);
    let reply = sender
        .send_group_message(&mut SystemLauncher, group, message)
        .map_err(|e| anyhow::anyhow!(e.reply()))?;

    println!("✓ {reply}");
    println!("  Message: {message}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("18:30"), Ok((18, 30)));
        assert_eq!(parse_clock("07:05"), Ok((7, 5)));
        assert!(parse_clock("24:00").is_err());
        assert!(parse_clock("noon").is_err());
    }
}
