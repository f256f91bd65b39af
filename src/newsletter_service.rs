use crate::domain::{OperationResult, Subscriber};
use crate::repository::{RepositoryError, SubscriberRepository};
use crate::validation::{describe, SubscriberValidation};
use std::sync::Arc;

pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Signup and unsubscribe on top of whichever repository was selected at startup.
///
/// Every call stands on its own: check existence, then mutate. The repository is responsible for
/// keeping that pair safe against concurrent calls for the same email.
#[derive(Clone)]
pub struct NewsletterService {
    repository: Arc<dyn SubscriberRepository>,
    validator: Arc<dyn SubscriberValidation>,
}

impl NewsletterService {
    pub fn new(
        repository: Arc<dyn SubscriberRepository>,
        validator: Arc<dyn SubscriberValidation>,
    ) -> Self {
        Self {
            repository,
            validator,
        }
    }

    pub fn repository(&self) -> &Arc<dyn SubscriberRepository> {
        &self.repository
    }

    #[tracing::instrument(
        name = "Signing up a new subscriber",
        skip(self, subscriber),
        fields(
            subscriber_email = %subscriber.email,
            subscriber_name = %subscriber.name
        )
    )]
    pub async fn sign_up(&self, subscriber: Subscriber) -> OperationResult {
        let violations = self.validator.validate(&subscriber);
        if !violations.is_empty() {
            return OperationResult::failure(describe(&violations));
        }

        if subscriber.email.trim().is_empty() {
            return OperationResult::failure("Invalid subscriber information.");
        }

        self.try_sign_up(subscriber)
            .await
            .unwrap_or_else(unexpected_failure)
    }

    async fn try_sign_up(&self, subscriber: Subscriber) -> Result<OperationResult, RepositoryError> {
        if self.repository.exists(&subscriber.email).await? {
            return Ok(OperationResult::failure(
                "You are already subscribed to our newsletter.",
            ));
        }

        let name = subscriber.name.clone();
        Ok(if self.repository.add(subscriber).await {
            tracing::info!("New subscriber has been saved");
            OperationResult::success(format!(
                "Welcome to our newsletter, {name}! You'll receive updates soon."
            ))
        } else {
            OperationResult::failure("Failed to add your subscription. Please try again.")
        })
    }

    #[tracing::instrument(name = "Unsubscribing", skip(self, email), fields(subscriber_email = %email))]
    pub async fn unsubscribe(&self, email: &str) -> OperationResult {
        if email.trim().is_empty() {
            return OperationResult::failure("Invalid email address.");
        }

        self.try_unsubscribe(email)
            .await
            .unwrap_or_else(unexpected_failure)
    }

    async fn try_unsubscribe(&self, email: &str) -> Result<OperationResult, RepositoryError> {
        if !self.repository.exists(email).await? {
            return Ok(OperationResult::failure(
                "We couldn't find your subscription in our system.",
            ));
        }

        Ok(if self.repository.delete(email).await? {
            tracing::info!("Subscriber has been removed");
            OperationResult::success(
                "You have been successfully removed from our newsletter. We're sorry to see you go!",
            )
        } else {
            OperationResult::failure("Failed to remove your subscription. Please try again.")
        })
    }

    #[tracing::instrument(name = "Listing subscribers", skip(self))]
    pub async fn list_subscribers(&self) -> Vec<Subscriber> {
        self.repository.list().await
    }
}

fn unexpected_failure(e: RepositoryError) -> OperationResult {
    tracing::error!(error.cause_chain = ?e, error.message = %e, "Subscription workflow failed");
    OperationResult::failure(UNEXPECTED_ERROR_MESSAGE)
}
