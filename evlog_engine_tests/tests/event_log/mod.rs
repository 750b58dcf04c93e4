mod framing;
mod helpers;
mod scenario;
mod truncation;
mod writer_session;
