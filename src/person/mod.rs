//! The people whose income and expenses are tracked.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod people_page;

pub use core::{
    Age, NewPerson, Person, PersonId, PersonName, create_person, create_person_table,
    delete_person, get_people, get_person,
};
pub use create_endpoint::create_person_endpoint;
pub use delete_endpoint::delete_person_endpoint;
pub use people_page::get_people_page;
