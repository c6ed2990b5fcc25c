// API Routes Module

pub mod health;
pub mod logs;
