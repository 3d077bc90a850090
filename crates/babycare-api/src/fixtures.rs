//! Demonstration babysitters shown alongside live records while the
//! directory is sparse. Read-only; never persisted.

use babycare_types::api::{BabysitterDetail, DirectoryEntry};

#[derive(Debug)]
pub struct DemoBabysitter {
    pub id: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub age: u32,
    pub years_experience: u32,
    pub description: &'static str,
    pub hourly_rate: f64,
    pub certifications: &'static [&'static str],
    pub specialties: &'static [&'static str],
    pub availability: &'static [&'static str],
    pub average_rating: f64,
    pub total_reviews: u32,
    pub avatar_initials: &'static str,
}

impl DemoBabysitter {
    pub fn entry(&self) -> DirectoryEntry {
        DirectoryEntry {
            id: self.id.to_string(),
            name: self.name.to_string(),
            city: self.city.to_string(),
            age: Some(self.age),
            years_experience: Some(self.years_experience),
            description: self.description.to_string(),
            hourly_rate: Some(self.hourly_rate),
            average_rating: self.average_rating,
            total_reviews: self.total_reviews,
            avatar_initials: self.avatar_initials.to_string(),
            is_demo: true,
        }
    }

    pub fn detail(&self) -> BabysitterDetail {
        BabysitterDetail {
            id: self.id.to_string(),
            name: self.name.to_string(),
            city: self.city.to_string(),
            phone: None,
            age: Some(self.age),
            years_experience: Some(self.years_experience),
            description: self.description.to_string(),
            hourly_rate: Some(self.hourly_rate),
            certifications: owned(self.certifications),
            specialties: owned(self.specialties),
            availability: owned(self.availability),
            average_rating: self.average_rating,
            total_reviews: self.total_reviews,
            avatar_initials: self.avatar_initials.to_string(),
            is_demo: true,
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub static DEMO_BABYSITTERS: &[DemoBabysitter] = &[
    DemoBabysitter {
        id: "mock-1",
        name: "Maria Silva",
        city: "São Paulo",
        age: 28,
        years_experience: 6,
        description: "Pedagogue with six years caring for babies and toddlers. Calm, patient and fond of educational play.",
        hourly_rate: 35.0,
        certifications: &["Pediatric first aid", "Early childhood education"],
        specialties: &["Babies", "Educational activities"],
        availability: &["Weekday mornings", "Weekday afternoons"],
        average_rating: 4.9,
        total_reviews: 47,
        avatar_initials: "MS",
    },
    DemoBabysitter {
        id: "mock-2",
        name: "Ana Costa",
        city: "Rio de Janeiro",
        age: 32,
        years_experience: 10,
        description: "Nursing technician, experienced with children with special needs and medication routines.",
        hourly_rate: 45.0,
        certifications: &["Nursing technician", "Pediatric first aid"],
        specialties: &["Special needs", "Newborns"],
        availability: &["Nights", "Weekends"],
        average_rating: 4.8,
        total_reviews: 62,
        avatar_initials: "AC",
    },
    DemoBabysitter {
        id: "mock-3",
        name: "Juliana Santos",
        city: "Belo Horizonte",
        age: 24,
        years_experience: 3,
        description: "Psychology student who loves outdoor games, reading aloud and helping with homework.",
        hourly_rate: 28.0,
        certifications: &["Pediatric first aid"],
        specialties: &["School-age children", "Homework help"],
        availability: &["Weekday afternoons", "Evenings"],
        average_rating: 4.7,
        total_reviews: 21,
        avatar_initials: "JS",
    },
    DemoBabysitter {
        id: "mock-4",
        name: "Fernanda Oliveira",
        city: "Curitiba",
        age: 41,
        years_experience: 15,
        description: "Fifteen years as a family nanny. Reliable with twins, sleep routines and healthy meals.",
        hourly_rate: 50.0,
        certifications: &["Child nutrition", "Pediatric first aid"],
        specialties: &["Twins", "Sleep routines", "Cooking"],
        availability: &["Full-time weekdays"],
        average_rating: 5.0,
        total_reviews: 88,
        avatar_initials: "FO",
    },
    DemoBabysitter {
        id: "mock-5",
        name: "Camila Pereira",
        city: "Porto Alegre",
        age: 26,
        years_experience: 4,
        description: "Bilingual (Portuguese and English) babysitter who teaches through songs and games.",
        hourly_rate: 40.0,
        certifications: &["English teaching certificate"],
        specialties: &["Bilingual care", "Music"],
        availability: &["Weekends", "Evenings"],
        average_rating: 4.6,
        total_reviews: 18,
        avatar_initials: "CP",
    },
    DemoBabysitter {
        id: "mock-6",
        name: "Patrícia Almeida",
        city: "Salvador",
        age: 35,
        years_experience: 9,
        description: "Former preschool teacher. Organised, affectionate and used to looking after siblings together.",
        hourly_rate: 38.0,
        certifications: &["Early childhood education", "Pediatric first aid"],
        specialties: &["Siblings", "Preschoolers"],
        availability: &["Weekday mornings", "Weekends"],
        average_rating: 4.8,
        total_reviews: 35,
        avatar_initials: "PA",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DEMO_ID_PREFIX, avatar_initials};

    #[test]
    fn demo_ids_are_unique_and_prefixed() {
        let mut ids: Vec<_> = DEMO_BABYSITTERS.iter().map(|d| d.id).collect();
        assert!(ids.iter().all(|id| id.starts_with(DEMO_ID_PREFIX)));
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), DEMO_BABYSITTERS.len());
    }

    #[test]
    fn demo_initials_match_names() {
        for demo in DEMO_BABYSITTERS {
            assert_eq!(demo.avatar_initials, avatar_initials(demo.name));
        }
    }
}
