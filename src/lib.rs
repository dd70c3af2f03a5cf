//! Builds Compass command lines and temporary `config.rb` scripts from
//! structured build options, and prepends banners to the compiled CSS.

pub mod args;
pub mod banner;
pub mod config;
pub mod fs;
pub mod runner;
