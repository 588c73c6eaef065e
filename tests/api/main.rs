mod helpers;
mod preflight;
mod subscribe;
