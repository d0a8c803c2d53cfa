mod auth;
mod dispatcher;
mod session;
