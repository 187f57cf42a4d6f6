pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_interpolate_parameters() {
        assert_eq!(
            Message::TimedOut("Ada".to_string(), "09:00".to_string()).to_string(),
            "Ada timed out after 09:00"
        );
        assert_eq!(Message::ActivitiesDeleted(2).to_string(), "2 activities deleted");
        assert_eq!(
            Message::InvalidAutoCloseHour(25).to_string(),
            "Invalid auto-close hour: 25 (allowed 0-23)"
        );
    }
}
