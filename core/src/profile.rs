//! Synthetic user profile generation using curated value lists.
//!
//! One profile per simulated journey, sampled uniformly from the
//! configured pools plus a country-conditioned region list. Profiles are
//! immutable once generated and discarded when the journey completes.

use crate::{config::UserPools, rng::SimRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported country codes. France and Germany share the "EU" region key
/// for rate-table lookup; everyone else keys on their own code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    US,
    CA,
    FR,
    DE,
    UK,
}

impl Country {
    pub fn code(&self) -> &'static str {
        match self {
            Self::US => "US",
            Self::CA => "CA",
            Self::FR => "FR",
            Self::DE => "DE",
            Self::UK => "UK",
        }
    }

    /// Grouping key for conversion-rate lookup.
    pub fn region_key(&self) -> &'static str {
        match self {
            Self::FR | Self::DE => "EU",
            other => other.code(),
        }
    }

    /// State/region names a generated profile may carry.
    pub fn regions(&self) -> &'static [&'static str] {
        match self {
            Self::US => US_STATES,
            Self::CA => CA_PROVINCES,
            Self::FR => FR_REGIONS,
            Self::DE => DE_REGIONS,
            Self::UK => UK_REGIONS,
        }
    }
}

/// The identity and attribute bundle that flag evaluation and event
/// tracking calls are keyed on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub key: String,
    pub anonymous: bool,
    pub name: String,
    pub country: Country,
    pub state: String,
    pub pet_type: String,
    pub plan_type: String,
    pub payment_type: String,
}

pub struct ProfileGenerator {
    pools: UserPools,
}

impl ProfileGenerator {
    pub fn new(pools: UserPools) -> Self {
        Self { pools }
    }

    /// Produce one profile. Uniform over every pool; no side effects.
    pub fn generate(&self, rng: &mut SimRng) -> UserProfile {
        let country = *rng.pick(&self.pools.countries);
        let state = (*rng.pick(country.regions())).to_string();
        let first = *rng.pick(FIRST_NAMES);
        let last = *rng.pick(LAST_NAMES);

        UserProfile {
            key: format!(
                "{}.{}-{}",
                first.to_lowercase(),
                last.to_lowercase(),
                Uuid::new_v4()
            ),
            anonymous: false,
            name: format!("{first} {last}"),
            country,
            state,
            pet_type: rng.pick(&self.pools.pet_types).clone(),
            plan_type: rng.pick(&self.pools.plan_types).clone(),
            payment_type: rng.pick(&self.pools.payment_types).clone(),
        }
    }
}

const FIRST_NAMES: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard",
    "Joseph", "Thomas", "Daniel", "Matthew", "Anthony", "Mark", "Steven",
    "Andrew", "Joshua", "Kevin", "Brian", "Timothy", "Jason", "Ryan",
    "Jacob", "Nicholas", "Eric", "Jonathan", "Stephen", "Justin", "Scott",
    "Brandon", "Benjamin", "Samuel", "Alexander", "Patrick", "Jack",
    "Dennis", "Tyler", "Aaron", "Adam", "Nathan", "Henry", "Zachary",
    "Peter", "Kyle", "Noah", "Ethan", "Christian", "Sean", "Austin",
    "Mary", "Patricia", "Jennifer", "Linda", "Elizabeth", "Susan",
    "Jessica", "Sarah", "Karen", "Lisa", "Nancy", "Sandra", "Ashley",
    "Kimberly", "Emily", "Donna", "Michelle", "Carol", "Amanda", "Melissa",
    "Stephanie", "Rebecca", "Sharon", "Laura", "Cynthia", "Amy", "Angela",
    "Anna", "Brenda", "Pamela", "Emma", "Nicole", "Samantha", "Katherine",
    "Christine", "Rachel", "Janet", "Maria", "Heather", "Diane", "Julie",
    "Olivia", "Victoria", "Kelly", "Lauren", "Christina", "Megan",
    "Andrea", "Hannah", "Martha", "Sara", "Madison", "Abigail", "Sophia",
    "Grace", "Natalie", "Charlotte",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller",
    "Davis", "Rodriguez", "Martinez", "Hernandez", "Lopez", "Gonzalez",
    "Wilson", "Anderson", "Thomas", "Taylor", "Moore", "Jackson", "Martin",
    "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez", "Clark",
    "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King",
    "Wright", "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green",
    "Adams", "Nelson", "Baker", "Hall", "Rivera", "Campbell", "Mitchell",
    "Carter", "Roberts", "Gomez", "Phillips", "Evans", "Turner", "Diaz",
    "Parker", "Cruz", "Edwards", "Collins", "Reyes", "Stewart", "Morris",
    "Morales", "Murphy", "Cook", "Rogers", "Gutierrez", "Ortiz", "Morgan",
    "Cooper", "Peterson", "Bailey", "Reed", "Kelly", "Howard", "Ramos",
    "Kim", "Cox", "Ward", "Richardson", "Watson", "Brooks", "Chavez",
    "Wood", "Bennett", "Gray", "Mendoza", "Ruiz", "Hughes", "Price",
    "Alvarez", "Castillo", "Sanders", "Patel", "Myers", "Long", "Ross",
    "Foster", "Jimenez", "Powell",
];

const US_STATES: &[&str] = &[
    "Alabama", "Alaska", "Arizona", "Arkansas", "California", "Colorado",
    "Connecticut", "Delaware", "Florida", "Georgia", "Hawaii", "Idaho",
    "Illinois", "Indiana", "Iowa", "Kansas", "Kentucky", "Louisiana",
    "Maine", "Maryland", "Massachusetts", "Michigan", "Minnesota",
    "Mississippi", "Missouri", "Montana", "Nebraska", "Nevada",
    "New Hampshire", "New Jersey", "New Mexico", "New York",
    "North Carolina", "North Dakota", "Ohio", "Oklahoma", "Oregon",
    "Pennsylvania", "Rhode Island", "South Carolina", "South Dakota",
    "Tennessee", "Texas", "Utah", "Vermont", "Virginia", "Washington",
    "West Virginia", "Wisconsin", "Wyoming",
];

const CA_PROVINCES: &[&str] = &[
    "ON", "QC", "BC", "AB", "MB", "SK", "NS", "NB", "NL", "PE", "YT",
    "NT", "NU",
];

const FR_REGIONS: &[&str] = &[
    "Paris", "Bouches-du-Rhône", "Nord", "Rhône", "Haute-Garonne",
];

const DE_REGIONS: &[&str] = &[
    "Berlin", "Bavaria", "North Rhine-Westphalia", "Baden-Württemberg",
    "Hesse",
];

const UK_REGIONS: &[&str] = &[
    "Greater London", "West Midlands", "Greater Manchester",
    "West Yorkshire", "Kent",
];
