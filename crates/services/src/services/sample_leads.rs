//! Random but plausible leads for populating a development database.

use chrono::{DateTime, Duration, Utc};
use db::models::lead::{CLIENT_DOMAINS, CONTACT_PLATFORMS, CreateLead, LEAD_STATUSES};
use rand::{Rng, seq::SliceRandom};

pub const DEFAULT_COUNT: usize = 50;
/// Last-contact dates fall within this many days before now.
pub const CONTACT_WINDOW_DAYS: i64 = 90;

const LOCATIONS: [&str; 10] = [
    "New York, USA",
    "London, UK",
    "Tokyo, Japan",
    "Berlin, Germany",
    "Sydney, Australia",
    "Toronto, Canada",
    "Singapore",
    "Hong Kong",
    "Paris, France",
    "Mumbai, India",
];

const FIRST_NAMES: [&str; 20] = [
    "John", "Emma", "Michael", "Olivia", "William", "Sophia", "James", "Ava", "Robert",
    "Isabella", "David", "Mia", "Joseph", "Charlotte", "Thomas", "Amelia", "Daniel", "Harper",
    "Matthew", "Evelyn",
];

const LAST_NAMES: [&str; 20] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Taylor", "Moore",
    "Jackson", "Martin", "Lee",
];

const MAIL_DOMAINS: [&str; 4] = ["gmail.com", "outlook.com", "company.com", "business.org"];

const PHONE_FORMATS: [&str; 4] = [
    "+1 (###) ###-####",
    "+44 ## #### ####",
    "+49 ### #######",
    "+81 ## #### ####",
];

const NOTES: [&str; 6] = [
    "Initial contact was promising.",
    "Expressed interest in our services.",
    "Referred by an existing client.",
    "Met at an industry conference.",
    "Requested additional information about pricing.",
    "Needs to discuss with the team before moving forward.",
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn phone<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, &PHONE_FORMATS)
        .chars()
        .map(|c| match c {
            '#' => char::from(b'0' + rng.gen_range(0..10u8)),
            other => other,
        })
        .collect()
}

pub fn generate_lead<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> CreateLead {
    let name = format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES));
    let email = format!(
        "{}{}@{}",
        name.to_lowercase().replace(' ', "."),
        rng.gen_range(0..1000),
        pick(rng, &MAIL_DOMAINS)
    );
    let days_ago = rng.gen_range(0..CONTACT_WINDOW_DAYS);

    CreateLead {
        name,
        email,
        phone: phone(rng),
        status: pick(rng, &LEAD_STATUSES).to_string(),
        client_domain: pick(rng, &CLIENT_DOMAINS).to_string(),
        contact_platform: pick(rng, &CONTACT_PLATFORMS).to_string(),
        location: pick(rng, &LOCATIONS).to_string(),
        note: rng.gen_bool(0.7).then(|| pick(rng, &NOTES).to_string()),
        company_id: None,
        last_contact_date: Some(now - Duration::days(days_ago)),
    }
}
