pub mod aips;
pub mod atc;
pub mod bag;
pub mod peddose;
pub mod refdata;
pub mod swissmedic;
