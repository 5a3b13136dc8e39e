//! The rotating news feed.
//!
//! A fixed pool of headlines, four of which are visible at a time. Every
//! [`ROTATION_PERIOD`] one visible item is swapped for a hidden one. Readers
//! get an immutable snapshot that is replaced, never mutated.

use crate::store::{LikeStore, StoreError};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Items visible at once.
pub const VISIBLE_ITEMS: usize = 4;

/// Time between rotations.
pub const ROTATION_PERIOD: Duration = Duration::from_secs(5);

/// Errors that can occur while updating the feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The like store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No visible item at this position.
    #[error("No visible news item at position {0}")]
    NoSuchItem(usize),
}

/// One visible headline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    /// Stable id, the like store key.
    pub id: u32,
    /// Headline text.
    pub text: Arc<str>,
    /// Like count.
    pub likes: u32,
}

/// Timer-driven feed over a fixed pool.
#[derive(Debug)]
pub struct NewsFeed<S: LikeStore> {
    pool: Vec<(u32, Arc<str>)>,
    store: S,
    visible: Arc<[NewsItem]>,
    elapsed: Duration,
}

impl<S: LikeStore> NewsFeed<S> {
    /// Show [`VISIBLE_ITEMS`] random distinct items from `pool` with their
    /// stored likes.
    pub fn new<R: Rng + ?Sized>(pool: Vec<(u32, Arc<str>)>, store: S, rng: &mut R) -> Result<Self, FeedError> {
        let mut visible = Vec::with_capacity(VISIBLE_ITEMS);
        for (id, text) in pool.choose_multiple(rng, VISIBLE_ITEMS) {
            visible.push(NewsItem {
                id: *id,
                text: Arc::clone(text),
                likes: store.likes(*id)?,
            });
        }
        log::debug!("News feed showing {} of {} items", visible.len(), pool.len());
        Ok(Self {
            pool,
            store,
            visible: visible.into(),
            elapsed: Duration::ZERO,
        })
    }

    /// The visible items.
    pub fn snapshot(&self) -> Arc<[NewsItem]> {
        Arc::clone(&self.visible)
    }

    /// The like store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Let `elapsed` pass, rotating once per full [`ROTATION_PERIOD`].
    /// Returns the number of rotations.
    pub fn advance<R: Rng + ?Sized>(&mut self, elapsed: Duration, rng: &mut R) -> Result<u32, FeedError> {
        self.elapsed += elapsed;
        let mut rotations = 0;
        while self.elapsed >= ROTATION_PERIOD {
            self.elapsed -= ROTATION_PERIOD;
            if self.rotate(rng)? {
                rotations += 1;
            }
        }
        Ok(rotations)
    }

    /// Replace one random visible item with a random hidden one. Returns
    /// `false` if every pool item is already visible.
    pub fn rotate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<bool, FeedError> {
        let hidden: Vec<_> = self
            .pool
            .iter()
            .filter(|(id, _)| self.visible.iter().all(|item| item.id != *id))
            .collect();
        let Some((id, text)) = hidden.choose(rng) else {
            return Ok(false);
        };
        if self.visible.is_empty() {
            return Ok(false);
        }

        let item = NewsItem {
            id: *id,
            text: Arc::clone(text),
            likes: self.store.likes(*id)?,
        };
        let slot = rng.gen_range(0..self.visible.len());
        log::debug!("Rotating news item {} out for {}", self.visible[slot].id, item.id);

        let mut visible = self.visible.to_vec();
        visible[slot] = item;
        self.visible = visible.into();
        Ok(true)
    }

    /// Add one like to the visible item at `position` and persist it.
    /// Returns the new count.
    pub fn like(&mut self, position: usize) -> Result<u32, FeedError> {
        let item = self.visible.get(position).ok_or(FeedError::NoSuchItem(position))?;
        let likes = item.likes.saturating_add(1);
        self.store.upsert(item.id, likes)?;

        let mut visible = self.visible.to_vec();
        visible[position].likes = likes;
        self.visible = visible.into();
        Ok(likes)
    }
}

/// The stock headlines.
pub fn default_pool() -> Vec<(u32, Arc<str>)> {
    [
        "The Sun is mildly disturbed and so is the geomagnetic field; weak flare activity poses no risk to Earth.",
        "A giant prominence eighty times the size of Earth formed overnight and broke away from the Sun.",
        "Strong magnetic storms began around midnight, with the Kp index ranging from G2 to G3.",
        "The Orionid meteor shower peaks on 21 October, and the new moon makes for ideal viewing conditions.",
        "Earth has entered a plasma stream from a coronal hole earlier than forecast.",
        "Sunspots have almost vanished from the Earth-facing side of the Sun, so fewer flares are expected.",
        "A glowing cloud seen over southern regions was left by a rocket launched from California.",
        "Glowing objects over Astana may have been burning fragments of a spacecraft.",
        "Scientists predicted the arrival and trajectory of the asteroid that fell in Yakutia ahead of time.",
        "Two potentially hazardous asteroids, 2007 JX2 and 2020 XR, will pass near Earth's orbit.",
    ]
    .into_iter()
    .zip(0..)
    .map(|(text, id)| (id, Arc::from(text)))
    .collect()
}
