use time::OffsetDateTime;

pub trait SessionIo: Send + Sync + 'static {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug)]
pub struct ProductionSessionIo;

impl SessionIo for ProductionSessionIo {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
