use super::activity::JobReference;

/// A person who can clock in: a student or staff member on the roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    /// Identifier typed at the punch kiosk
    pub school_id: String,
    pub name: String,
    /// Current job assignment; required to time in
    pub job: Option<JobReference>,
    /// Passed through to performance views untouched
    pub profile_picture: Option<String>,
}

impl Account {
    pub fn new(id: &str, school_id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            school_id: school_id.to_string(),
            name: name.to_string(),
            job: None,
            profile_picture: None,
        }
    }

    pub fn with_job(mut self, job: JobReference) -> Self {
        self.job = Some(job);
        self
    }

    pub fn with_profile_picture(mut self, url: &str) -> Self {
        self.profile_picture = Some(url.to_string());
        self
    }

    /// Case-insensitive match on name or school id.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.school_id.to_lowercase().contains(&needle)
    }
}
