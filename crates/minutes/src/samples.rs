//! Built-in transcripts for demos and tests.

use crate::model::Metadata;

#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub key: &'static str,
    pub title: &'static str,
    pub transcript: &'static str,
    metadata: &'static [(&'static str, &'static str)],
}

impl Sample {
    pub fn metadata(&self) -> Metadata {
        self.metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

pub const SAMPLES: &[Sample] = &[
    Sample {
        key: "daily_standup",
        title: "Daily Standup Meeting",
        transcript: "\
John: Good morning everyone, let's start our daily standup.
Sarah: Yesterday I completed the user authentication module. Today I'll work on the API integration.
Mike: I finished the database migration and will focus on frontend components today.
Lisa: I worked on bug fixes yesterday. Planning to review the pull requests today.
John: Great updates everyone. Any blockers?
Sarah: I need the API documentation from the backend team.
Mike: No blockers on my end.
Lisa: All good here.
John: Thanks everyone, let's have a productive day!
",
        metadata: &[
            ("meeting_type", "Daily Standup"),
            ("duration", "15 minutes"),
            ("attendees", "John, Sarah, Mike, Lisa"),
        ],
    },
    Sample {
        key: "planning_session",
        title: "Sprint Planning Session",
        transcript: "\
Manager: Welcome to sprint planning. Let's review our backlog.
Developer1: The user stories for the payment system are ready.
Developer2: I estimate the payment integration at 5 story points.
QA: We'll need 2 days for testing after development.
Manager: Sounds good. What about the reporting feature?
Developer1: That's more complex, probably 8 story points.
Developer2: I agree, especially with the data visualization requirements.
QA: Testing for reporting will need 3 days.
Manager: Let's prioritize payment system first, then reporting.
Developer1: Agreed. I'll take the payment system.
Developer2: I'll handle the reporting feature.
Manager: Perfect. Sprint goal is payment system completion.
",
        metadata: &[
            ("meeting_type", "Planning Session"),
            ("duration", "45 minutes"),
            ("attendees", "Manager, Developer1, Developer2, QA"),
        ],
    },
    Sample {
        key: "client_review",
        title: "Quarterly Client Review",
        transcript: "\
Priya: Thanks for joining the quarterly review. The main issue from the client side is the onboarding timeline.
Tom: Understood. The data import took longer than planned because of the legacy formats.
Client: The delay is a problem for our launch, the budget for this phase is already committed.
Priya: We decided to add a second engineer to the import work for the next three weeks.
Tom: I will send a revised timeline to the client by Thursday.
Client: That works. We also agreed that weekly status calls continue until launch.
Priya: Alex should prepare the training material for the client's support team.
Client: Good. The critical point for us is a stable release before the end of the quarter.
Priya: Understood, we will track that as the key milestone.
",
        metadata: &[
            ("meeting_type", "Client Meeting"),
            ("duration", "30 minutes"),
            ("attendees", "Priya, Tom, Client"),
        ],
    },
];

pub fn get(key: &str) -> Option<&'static Sample> {
    SAMPLES.iter().find(|s| s.key == key)
}

pub fn keys() -> Vec<&'static str> {
    SAMPLES.iter().map(|s| s.key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_key() {
        let sample = get("daily_standup").unwrap();
        assert_eq!(sample.title, "Daily Standup Meeting");
        assert_eq!(sample.metadata()["attendees"], "John, Sarah, Mike, Lisa");
        assert!(get("nope").is_none());
    }

    #[test]
    fn test_keys_in_order() {
        assert_eq!(keys(), vec!["daily_standup", "planning_session", "client_review"]);
    }

    #[test]
    fn test_samples_are_long_enough_to_process() {
        for sample in SAMPLES {
            assert!(sample.transcript.trim().chars().count() > 100, "{}", sample.key);
        }
    }
}
