pub mod dry_run;
pub mod preview;
pub mod required;
pub mod simulate;
