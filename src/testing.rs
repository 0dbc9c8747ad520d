//! Shared fixtures for unit tests

use crate::data::{Dataset, DescriptionTable, PointRecord, TopicId};
use chrono::{DateTime, TimeZone, Utc};

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn point(topic: Option<i64>, created_at: DateTime<Utc>) -> PointRecord {
    PointRecord {
        x: 1.0,
        y: 2.0,
        topic: topic.map(TopicId),
        label: topic.map(|t| format!("Topic {}", t)).unwrap_or_default(),
        toxicity: 0.25,
        posts: 3,
        created_at,
        marker_size: 5.0,
    }
}

/// Twelve points across 2023-04-17..=2023-10-27, topics 1, 2 and 10,
/// descriptions for 1 and 2 only
pub fn sample_dataset() -> Dataset {
    let dates = [
        utc(2023, 4, 17),
        utc(2023, 4, 30),
        utc(2023, 5, 15),
        utc(2023, 5, 31),
        utc(2023, 6, 1),
        utc(2023, 6, 2),
        utc(2023, 7, 4),
        utc(2023, 8, 19),
        utc(2023, 9, 1),
        utc(2023, 9, 30),
        utc(2023, 10, 3),
        utc(2023, 10, 27),
    ];
    let topics = [1, 2, 10];

    let points = dates
        .iter()
        .enumerate()
        .map(|(i, &created_at)| {
            let mut p = point(Some(topics[i % topics.len()]), created_at);
            p.x = i as f64;
            p.y = (i as f64) * 0.5;
            p.marker_size = 1.0 + i as f64;
            p
        })
        .collect();

    let descriptions = vec![
        (TopicId(1), "Border enforcement and wall funding"),
        (TopicId(2), "Asylum processing at ports of entry"),
    ]
    .into_iter()
    .collect::<DescriptionTable>();

    Dataset::new(points, descriptions)
}
