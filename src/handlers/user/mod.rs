// handlers/user/mod.rs - User registry handlers

pub mod create; // POST /users
pub mod show;   // GET /users/:user_id

pub use create::user_create;
pub use show::user_show;
