pub mod auth;
pub mod auth_ops;
pub mod chatbot;
pub mod confirm;
pub mod controller;
pub mod db;
pub mod flash;
pub mod gateway;
pub mod language;
pub mod listing;
pub mod logging;
pub mod manage_achievement_types;
pub mod manage_achievements;
pub mod manage_aspirations;
pub mod manage_bem;
pub mod manage_carousel;
pub mod manage_chatbot;
pub mod manage_directors;
pub mod manage_meta;
pub mod notification;
pub mod password_reset;
pub mod security;
pub mod services;
pub mod surreal;
pub mod templates;
pub mod uploads;
pub mod validation;
