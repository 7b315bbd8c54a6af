//! Module containing support for [Command]s.
//!
//! A [Command] expresses the intent of mutating the state held by a
//! data source. Depending on the use case, a Command can produce a result
//! (e.g. the new state of the mutated resource), or only signal completion
//! by using `()` as its [Output][Command::Output].

use async_trait::async_trait;

/// A request that may mutate the data source it is executed against,
/// optionally producing a result.
///
/// Like [Query][crate::Query], the data source is only named through the
/// [`DataSource`][Command::DataSource] associated type and is resolved by
/// the [Dispatcher][crate::Dispatcher] on every dispatch.
///
/// When a retry capability is configured, [`execute`][Command::execute]
/// can be called more than once for the same dispatch, against the same
/// data source instance.
#[async_trait]
pub trait Command: Send + Sync {
    /// The data source type the Command is executed against.
    type DataSource: Send + Sync + 'static;
    /// The result of the Command execution; use `()` for Commands
    /// that only signal completion.
    type Output: Send;
    /// The error type returned when the Command execution fails.
    type Error: Send;

    /// Executes the Command against the resolved data source instance.
    ///
    /// # Errors
    ///
    /// An [Error][Command::Error] is returned if the Command has not been executed.
    async fn execute(&self, source: &Self::DataSource) -> Result<Self::Output, Self::Error>;
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("the list is full")]
    struct ListFull;

    struct Push(u8);

    #[async_trait]
    impl Command for Push {
        type DataSource = Mutex<Vec<u8>>;
        type Output = ();
        type Error = ListFull;

        async fn execute(&self, source: &Self::DataSource) -> Result<(), ListFull> {
            let mut list = source.lock().map_err(|_| ListFull)?;

            if list.len() >= 2 {
                return Err(ListFull);
            }

            list.push(self.0);

            Ok(())
        }
    }

    #[tokio::test]
    async fn completion_only_commands_mutate_the_data_source() {
        let source = Mutex::new(Vec::new());

        Push(1).execute(&source).await.expect("first push should succeed");
        Push(2).execute(&source).await.expect("second push should succeed");

        let err = Push(3)
            .execute(&source)
            .await
            .expect_err("third push should fail");

        assert_eq!("the list is full", err.to_string());
        assert_eq!(vec![1, 2], *source.lock().unwrap());
    }
}
