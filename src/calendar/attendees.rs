use crate::calendar::{Attendee, ValidationError};

pub const MAX_ATTENDEES: usize = 20;

pub fn default_domain_labels() -> Vec<String> {
    vec!["monash".to_string(), "edu".to_string()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendeeValidator {
    required_labels: Vec<String>,
    cap: usize,
}

impl Default for AttendeeValidator {
    fn default() -> Self {
        Self::new(default_domain_labels(), MAX_ATTENDEES)
    }
}

impl AttendeeValidator {
    pub fn new(required_labels: Vec<String>, cap: usize) -> Self {
        Self {
            required_labels,
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn check(&self, address: &str) -> Result<Attendee, ValidationError> {
        let address = address.trim();
        let Some((local, domain)) = address.split_once('@') else {
            return Err(ValidationError::AttendeeDomain(address.to_string()));
        };

        let labels: Vec<&str> = domain.split('.').collect();
        let belongs = !local.is_empty()
            && self
                .required_labels
                .iter()
                .all(|required| labels.contains(&required.as_str()));

        if belongs {
            Ok(Attendee::new(address))
        } else {
            Err(ValidationError::AttendeeDomain(address.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendeeSignal {
    Accepted,
    CapReached,
    Finished,
}

#[derive(Debug, Clone)]
pub struct AttendeeList {
    validator: AttendeeValidator,
    accepted: Vec<Attendee>,
}

impl AttendeeList {
    pub fn new(validator: AttendeeValidator) -> Self {
        Self {
            validator,
            accepted: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.accepted.len() >= self.validator.cap()
    }

    pub fn len(&self) -> usize {
        self.accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    // An empty string ends collection. Rejected addresses leave the list
    // untouched and the caller asks again.
    pub fn offer(&mut self, raw: &str) -> Result<AttendeeSignal, ValidationError> {
        if raw.trim().is_empty() || self.is_full() {
            return Ok(AttendeeSignal::Finished);
        }

        let attendee = self.validator.check(raw)?;
        if !self.accepted.contains(&attendee) {
            self.accepted.push(attendee);
        }

        if self.is_full() {
            tracing::debug!("Attendee cap of {} reached", self.validator.cap());
            Ok(AttendeeSignal::CapReached)
        } else {
            Ok(AttendeeSignal::Accepted)
        }
    }

    pub fn into_attendees(self) -> Vec<Attendee> {
        self.accepted
    }
}
