pub mod fk;
