//! Demo content for `SEED_DEMO_DATA=true`, loaded only into an empty store.

use tracing::{info, warn};

use crate::{
    models::{
        course::{create_course, get_all_courses, CourseFields},
        instructor::{create_instructor, get_all_instructors, InstructorFields},
        testimonial::{create_testimonial, TestimonialFields},
    },
    store::Store,
    views::{COURSE_PLACEHOLDER, INSTRUCTOR_PLACEHOLDER},
};

const INSTRUCTORS: &[(&str, &str)] = &[
    (
        "Dr. Sarah Reynolds",
        "Dr. Reynolds is a leading expert in energy systems with over 15 years of experience in turbine optimization and power plant efficiency.",
    ),
    (
        "Prof. James Chen",
        "Professor Chen specializes in renewable energy integration and has consulted for major energy corporations worldwide on sustainable practices.",
    ),
    (
        "Eng. Maria Rodriguez",
        "Engineer Rodriguez brings practical field experience from her 20+ years working with industrial steam systems and energy recovery technologies.",
    ),
    (
        "PK Sinha",
        "PK Sinha is a renowned energy expert with over 25 years of experience in power generation, transmission, and distribution systems.\nHe has led major energy infrastructure projects across Asia and Europe.",
    ),
];

// (title, description, duration, index into INSTRUCTORS, registration link)
const COURSES: &[(&str, &str, &str, usize, &str)] = &[
    (
        "PowerUp Masterclass Series - Steam Turbine Distress Signals",
        "Learn to identify and troubleshoot critical steam turbine distress signals. Covers early detection methods, analysis techniques, and preventative maintenance strategies.",
        "6 Weeks",
        0,
        "https://lnkd.in/dhseGAEP",
    ),
    (
        "Advanced Energy Efficiency Optimization",
        "Hands-on training in energy auditing, system analysis, and implementation of efficiency measures for industrial systems.",
        "8 Weeks",
        1,
        "https://example.com/register",
    ),
    (
        "Renewable Integration for Power Engineers",
        "Grid stability, energy storage solutions, and smart grid technologies for integrating renewable sources into existing power systems.",
        "10 Weeks",
        2,
        "https://example.com/register",
    ),
    (
        "Industrial Energy Management Systems",
        "Implementing and managing energy management systems in industrial settings, including ISO 50001 and energy performance indicators.",
        "6 Weeks",
        1,
        "https://example.com/register",
    ),
    (
        "Power System Protection and Control",
        "Relay coordination, fault analysis, and modern digital protection systems for reliable power delivery.",
        "9 Weeks",
        3,
        "https://example.com/register",
    ),
    (
        "Smart Grid Technologies and Implementation",
        "Advanced metering infrastructure, distribution automation, and grid modernization strategies.",
        "8 Weeks",
        3,
        "https://example.com/register",
    ),
];

// (name, position, company, content)
const TESTIMONIALS: &[(&str, &str, &str, &str)] = &[
    (
        "Anil Mehta",
        "Plant Manager",
        "Tata Power",
        "The turbine masterclass paid for itself within a month. We caught a blade issue weeks before it would have forced an outage.",
    ),
    (
        "Laura Fischer",
        "Grid Planning Engineer",
        "Amprion",
        "Clear, practical and taught by people who have done the work. The protection course changed how our team reviews relay settings.",
    ),
];

/// Inserts the demo records unless courses or instructors already exist.
/// Returns whether anything was written.
pub async fn seed_demo_data(store: &Store) -> bool {
    if !get_all_courses(store).await.is_empty() || !get_all_instructors(store).await.is_empty() {
        info!("Store already has content, skipping demo data");
        return false;
    }

    let mut instructor_ids = Vec::with_capacity(INSTRUCTORS.len());
    for (name, bio) in INSTRUCTORS {
        let fields = InstructorFields {
            name: name.to_string(),
            bio: bio.to_string(),
            image_url: INSTRUCTOR_PLACEHOLDER.to_string(),
        };
        match create_instructor(store, fields).await {
            Some(instructor) => instructor_ids.push(instructor.id),
            None => {
                warn!(name, "Could not seed instructor, giving up on demo data");
                return false;
            }
        }
    }

    for (title, description, duration, instructor, link) in COURSES {
        let fields = CourseFields {
            title: title.to_string(),
            description: description.to_string(),
            duration: duration.to_string(),
            instructor_id: instructor_ids[*instructor].clone(),
            image_url: COURSE_PLACEHOLDER.to_string(),
            registration_link: Some(link.to_string()),
        };
        if create_course(store, fields).await.is_none() {
            warn!(title, "Could not seed course");
        }
    }

    for (name, position, company, content) in TESTIMONIALS {
        let fields = TestimonialFields {
            name: name.to_string(),
            position: position.to_string(),
            company: company.to_string(),
            content: content.to_string(),
            image_url: None,
        };
        if create_testimonial(store, fields).await.is_none() {
            warn!(name, "Could not seed testimonial");
        }
    }

    info!(
        instructors = INSTRUCTORS.len(),
        courses = COURSES.len(),
        testimonials = TESTIMONIALS.len(),
        "Seeded demo data"
    );
    true
}
