pub mod classes;
pub mod dispatcher;
pub mod recommend;
pub mod student;
