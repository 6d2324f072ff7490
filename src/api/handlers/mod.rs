pub mod health;
pub mod output;
pub mod pages;
pub mod static_files;
pub mod template;
pub mod upload;
