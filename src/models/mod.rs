pub mod course;
pub mod posting;

pub use course::CourseRef;
pub use posting::{
    HeldItem, NewHeldItem, NewPostingRequest, NewWantedItem, Posting, PostingStatus,
    SectionFilter, UpdatePostingRequest, WantedItem,
};
