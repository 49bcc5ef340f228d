use chrono::{Local, Timelike};
use rand::seq::SliceRandom;

const ANYTIME: &[&str] = &[
    "Hello! Welcome to {name}. How can I help you today?",
    "Hi there, this is {name}. What can I do for you?",
    "Thanks for calling {name}. How may I help you?",
];

const MORNING: &[&str] = &[
    "Good morning! This is {name}. How can I help you today?",
    "Good morning and welcome to {name}. What can I do for you?",
];

const AFTERNOON: &[&str] = &[
    "Good afternoon! You've reached {name}. How can I help?",
    "Good afternoon, this is {name}. What brings you in today?",
];

const EVENING: &[&str] = &[
    "Good evening! This is {name}. How can I help you tonight?",
    "Good evening and thanks for calling {name}.",
];

const NIGHT: &[&str] = &[
    "Hello, thanks for calling {name} this late. How can I help?",
    "{name} here, around the clock. What do you need help with?",
];

fn time_pool(hour: u32) -> &'static [&'static str] {
    match hour {
        5..=11 => MORNING,
        12..=16 => AFTERNOON,
        17..=20 => EVENING,
        _ => NIGHT,
    }
}

/// Call greeting for the current local time, with `{name}` filled in.
pub fn select_greeting(name: &str) -> String {
    select_greeting_for_hour(name, Local::now().hour())
}

fn select_greeting_for_hour(name: &str, hour: u32) -> String {
    let time_specific = time_pool(hour);
    let mut pool: Vec<&str> = Vec::with_capacity(ANYTIME.len() + time_specific.len());
    pool.extend_from_slice(ANYTIME);
    pool.extend_from_slice(time_specific);

    let mut rng = rand::thread_rng();
    let template = pool.choose(&mut rng).unwrap_or(&ANYTIME[0]);
    template.replace("{name}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_contains_name() {
        let greeting = select_greeting_for_hour("Acme Support", 10);
        assert!(greeting.contains("Acme Support"), "{greeting}");
    }

    #[test]
    fn no_placeholder_left_at_any_hour() {
        for hour in 0..24 {
            let greeting = select_greeting_for_hour("VoiceBot", hour);
            assert!(!greeting.contains("{name}"), "hour {hour}: {greeting}");
            assert!(!greeting.is_empty());
        }
    }

    #[test]
    fn pools_match_time_of_day() {
        assert!(time_pool(8).iter().all(|g| g.contains("morning")));
        assert!(time_pool(14).iter().all(|g| g.contains("afternoon")));
        assert!(time_pool(19).iter().all(|g| g.contains("evening")));
        assert!(time_pool(23).iter().any(|g| g.contains("late")));
    }

    #[test]
    fn time_pool_boundaries() {
        assert_eq!(time_pool(4), NIGHT);
        assert_eq!(time_pool(5), MORNING);
        assert_eq!(time_pool(11), MORNING);
        assert_eq!(time_pool(12), AFTERNOON);
        assert_eq!(time_pool(16), AFTERNOON);
        assert_eq!(time_pool(17), EVENING);
        assert_eq!(time_pool(20), EVENING);
        assert_eq!(time_pool(21), NIGHT);
    }
}
