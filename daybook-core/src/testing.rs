//! Scripted stand-ins for the remote services.

use std::cell::{Cell, RefCell};

use crate::remote::{RankRequest, RankingService, ServiceError, TagRequest, TaggingService};

type Reply = Box<dyn Fn() -> Result<String, ServiceError>>;

pub(crate) struct FakeRanker {
    reply: Reply,
    calls: Cell<usize>,
    last: RefCell<Option<RankRequest>>,
}

impl FakeRanker {
    pub(crate) fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::with(Box::new(move || Ok(text.clone())))
    }

    pub(crate) fn failing(err: fn() -> ServiceError) -> Self {
        Self::with(Box::new(move || Err(err())))
    }

    fn with(reply: Reply) -> Self {
        Self {
            reply,
            calls: Cell::new(0),
            last: RefCell::new(None),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn last_request(&self) -> Option<RankRequest> {
        self.last.borrow().clone()
    }
}

impl RankingService for FakeRanker {
    fn rank(&self, request: &RankRequest) -> Result<String, ServiceError> {
        self.calls.set(self.calls.get() + 1);
        *self.last.borrow_mut() = Some(request.clone());
        (self.reply)()
    }
}

pub(crate) struct FakeTagger {
    reply: Reply,
    last: RefCell<Option<TagRequest>>,
}

impl FakeTagger {
    pub(crate) fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self {
            reply: Box::new(move || Ok(text.clone())),
            last: RefCell::new(None),
        }
    }

    pub(crate) fn failing(err: fn() -> ServiceError) -> Self {
        Self {
            reply: Box::new(move || Err(err())),
            last: RefCell::new(None),
        }
    }

    pub(crate) fn last_request(&self) -> Option<TagRequest> {
        self.last.borrow().clone()
    }
}

impl TaggingService for FakeTagger {
    fn suggest_tags(&self, request: &TagRequest) -> Result<String, ServiceError> {
        *self.last.borrow_mut() = Some(request.clone());
        (self.reply)()
    }
}
