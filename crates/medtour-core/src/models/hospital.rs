//! Partner hospital models.

use serde::{Deserialize, Serialize};

/// A treatment provider cases can be assigned to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hospital {
    /// Unique hospital ID (`hospital_` prefix)
    pub id: String,
    pub name: String,
    /// City / country
    pub location: String,
    pub bed_capacity: u32,
    pub available_beds: u32,
    /// Specialties offered (e.g., ["cardiology", "oncology"])
    pub specialties: Vec<String>,
    /// Accreditation body (e.g., "JCI", "NABH")
    pub accreditation: Option<String>,
    pub contact: HospitalContact,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HospitalContact {
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Hospital {
    /// Create a hospital with required fields.
    pub fn new(name: String, location: String, bed_capacity: u32) -> Self {
        let now = super::timestamp_now();
        Self {
            id: super::new_id("hospital"),
            name,
            location,
            bed_capacity,
            available_beds: bed_capacity,
            specialties: Vec::new(),
            accreditation: None,
            contact: HospitalContact::default(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Case-insensitive specialty check.
    pub fn offers(&self, specialty: &str) -> bool {
        let specialty = specialty.to_lowercase();
        self.specialties
            .iter()
            .any(|s| s.to_lowercase() == specialty)
    }

    /// Fraction of beds in use (0.0 - 1.0).
    pub fn occupancy(&self) -> f64 {
        if self.bed_capacity == 0 {
            return 0.0;
        }
        let used = self.bed_capacity.saturating_sub(self.available_beds);
        used as f64 / self.bed_capacity as f64
    }
}

/// Field-level hospital update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HospitalPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bed_capacity: Option<u32>,
    #[serde(default)]
    pub available_beds: Option<u32>,
    #[serde(default)]
    pub specialties: Option<Vec<String>>,
    #[serde(default)]
    pub accreditation: Option<String>,
    #[serde(default)]
    pub contact: Option<HospitalContact>,
}

impl HospitalPatch {
    pub fn apply(self, hospital: &mut Hospital) {
        if let Some(name) = self.name {
            hospital.name = name;
        }
        if let Some(location) = self.location {
            hospital.location = location;
        }
        if let Some(bed_capacity) = self.bed_capacity {
            hospital.bed_capacity = bed_capacity;
        }
        if let Some(available_beds) = self.available_beds {
            hospital.available_beds = available_beds;
        }
        if let Some(specialties) = self.specialties {
            hospital.specialties = specialties;
        }
        if self.accreditation.is_some() {
            hospital.accreditation = self.accreditation;
        }
        if let Some(contact) = self.contact {
            hospital.contact = contact;
        }
        hospital.available_beds = hospital.available_beds.min(hospital.bed_capacity);
    }
}
