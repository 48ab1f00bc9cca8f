pub mod catalog;
pub mod completion;
pub mod domain;
pub mod ports;
pub mod reservation;
pub mod slug;

pub use domain::{
    AccountCredentials, Announcement, Guest, NewAnnouncement, NewReservation, NewSession,
    NewTextStudy, Participant, Person, Reservation, Session, SessionUpdate, TextStudy,
    TextStudyType,
};
pub use ports::{DatabaseService, PortError, PortResult};
