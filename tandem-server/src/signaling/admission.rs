use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Ограничение числа участников. Место освобождается при drop выданного `AdmissionSlot`.
#[derive(Debug, Clone)]
pub struct Admission {
    semaphore: Arc<Semaphore>,
    permits: usize,
    max: Option<usize>,
}

/// Занятое место; держится задачей сокета до ее завершения.
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
}

impl Admission {
    /// `None` снимает ограничение.
    pub fn new(max: Option<usize>) -> Self {
        let permits = max.unwrap_or(Semaphore::MAX_PERMITS);
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
            permits,
            max,
        }
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn occupied(&self) -> usize {
        self.permits - self.semaphore.available_permits()
    }

    pub fn try_acquire(&self) -> Option<AdmissionSlot> {
        self.semaphore
            .clone()
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionSlot { _permit: permit })
    }
}
