mod diagnostics;
mod health_check;
mod subscribers;
mod unsubscribe;
