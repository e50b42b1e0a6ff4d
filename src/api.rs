//! Guide data boundary. Everything crossing it carries ISO-8601 timestamp
//! strings; conversion to absolute instants happens here and only here.
//! Records that fail to parse as a valid interval are excluded rather than
//! repaired.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

use crate::errors::FetchError;
use crate::timewin::{self, TimeWindow};

pub type ChannelId = String;
pub type ProgramId = String;

// ---------------------------------------------------------------------------
// Core model (absolute instants, owned for the lifetime of the window)
// ---------------------------------------------------------------------------

/// A broadcast channel with its programs for the active window.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub channel_id: ChannelId,
    pub display_name: String,
    pub icon_ref: Option<String>,
    /// Vertical rendering order, externally supplied
    pub display_order: u32,
    /// Programs overlapping the active window, sorted by start time
    pub programs: Vec<Program>,
}

/// A scheduled program. Invariant: `start < end` (enforced at decode).
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub program_id: ProgramId,
    pub channel_id: ChannelId,
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    Title,
    Channel,
}

/// A search hit as returned by the search collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub program_id: ProgramId,
    pub channel_id: ChannelId,
    pub title: String,
    pub channel_name: String,
    pub category: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub match_type: MatchType,
}

/// A program with its channel context, for the details panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramDetail {
    pub program: Program,
    pub channel_name: String,
    pub icon_ref: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProgramDto {
    pub program_id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChannelDto {
    pub channel_id: String,
    pub display_name: String,
    #[serde(default)]
    pub icon_ref: Option<String>,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default)]
    pub programs: Vec<ProgramDto>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResultDto {
    pub program_id: String,
    pub channel_id: String,
    pub title: String,
    pub channel_name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub match_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProgramDetailDto {
    pub channel_id: String,
    pub channel_name: String,
    #[serde(default)]
    pub icon_ref: Option<String>,
    pub program: ProgramDto,
}

// ---------------------------------------------------------------------------
// Boundary conversion
// ---------------------------------------------------------------------------

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_instant(iso: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decodes a program DTO, rejecting records that do not form a valid
/// `start < end` interval.
pub fn program_from_dto(channel_id: &str, dto: &ProgramDto) -> Option<Program> {
    let start = parse_instant(&dto.start_time)?;
    let end = parse_instant(&dto.end_time)?;
    if start >= end {
        return None;
    }
    Some(Program {
        program_id: dto.program_id.clone(),
        channel_id: channel_id.to_string(),
        title: dto.title.clone(),
        category: dto.category.clone(),
        description: dto.description.clone(),
        start,
        end,
    })
}

/// Decodes the channel list, dropping malformed programs and ordering
/// channels by their externally supplied `display_order`.
pub fn channels_from_dtos(dtos: Vec<ChannelDto>) -> Vec<Channel> {
    let mut channels: Vec<Channel> = dtos
        .into_iter()
        .map(|dto| {
            let mut programs: Vec<Program> = dto
                .programs
                .iter()
                .filter_map(|p| program_from_dto(&dto.channel_id, p))
                .collect();
            programs.sort_by_key(|p| p.start);
            Channel {
                channel_id: dto.channel_id,
                display_name: dto.display_name,
                icon_ref: dto.icon_ref,
                display_order: dto.display_order,
                programs,
            }
        })
        .collect();
    channels.sort_by_key(|c| c.display_order);
    channels
}

pub fn search_hit_from_dto(dto: &SearchResultDto) -> Option<SearchHit> {
    let start = parse_instant(&dto.start_time)?;
    let end = parse_instant(&dto.end_time)?;
    if start >= end {
        return None;
    }
    let match_type = match dto.match_type.as_str() {
        "channel" => MatchType::Channel,
        _ => MatchType::Title,
    };
    Some(SearchHit {
        program_id: dto.program_id.clone(),
        channel_id: dto.channel_id.clone(),
        title: dto.title.clone(),
        channel_name: dto.channel_name.clone(),
        category: dto.category.clone(),
        start,
        end,
        match_type,
    })
}

pub fn detail_from_dto(dto: &ProgramDetailDto) -> Option<ProgramDetail> {
    let program = program_from_dto(&dto.channel_id, &dto.program)?;
    Some(ProgramDetail {
        program,
        channel_name: dto.channel_name.clone(),
        icon_ref: dto.icon_ref.clone(),
    })
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Async guide data collaborator. The backend proper (store, transport,
/// matching) lives outside this crate; the trait is the whole contract.
pub trait GuideBackend: Send + Sync {
    fn fetch_channels_with_programs(
        &self,
        start_iso: String,
        end_iso: String,
    ) -> BoxFuture<'static, Result<Vec<ChannelDto>, FetchError>>;

    fn search_programs(&self, query: String) -> BoxFuture<'static, Result<Vec<SearchResultDto>, FetchError>>;

    fn fetch_program_by_id(&self, id: String) -> BoxFuture<'static, Result<ProgramDetailDto, FetchError>>;
}

// ---------------------------------------------------------------------------
// Fixture backend
// ---------------------------------------------------------------------------

const SEARCH_RESULT_CAP: usize = 50;

/// Serves guide queries from an in-memory dataset loaded from a JSON file
/// (or the built-in sample). Search is plain case-insensitive substring
/// over program titles and channel names.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    channels: Vec<ChannelDto>,
}

impl JsonFileBackend {
    pub fn from_file(path: &std::path::Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let channels: Vec<ChannelDto> = serde_json::from_str(&content)?;
        Ok(Self { channels })
    }

    pub fn from_channels(channels: Vec<ChannelDto>) -> Self {
        Self { channels }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Deterministic three-day sample guide so the binary runs end-to-end
    /// without a real backend.
    pub fn sample(now: DateTime<Utc>) -> Self {
        const NAMES: [&str; 12] = [
            "Atlas One", "Northline", "Cinema Hub", "Docu Prime", "Kids Planet", "Sport Arena",
            "News 24", "Retro TV", "Music Box", "Science Now", "Travel Channel", "Comedy Vault",
        ];
        const TITLES: [&str; 10] = [
            "Morning Report", "The Long Road", "City Stories", "Deep Water", "Quiz Night",
            "Starlight Hour", "Field Notes", "Second Act", "The Workshop", "Night Shift",
        ];
        const CATEGORIES: [&str; 5] = ["news", "drama", "documentary", "sports", "entertainment"];

        let origin = timewin::snap_to_half_hour_floor(now - Duration::days(1));
        let horizon = now + Duration::days(3);
        let mut channels = Vec::new();
        for (ci, name) in NAMES.iter().enumerate() {
            let channel_id = format!("ch-{:03}", ci + 1);
            let mut programs = Vec::new();
            let mut cursor = origin;
            let mut slot = 0usize;
            while cursor < horizon {
                // 30/60/90-minute blocks in a channel-dependent pattern
                let slots = 1 + (ci + slot) % 3;
                let end = cursor + Duration::minutes(30 * slots as i64);
                let title = TITLES[(ci * 7 + slot) % TITLES.len()];
                programs.push(ProgramDto {
                    program_id: format!("{}-p{:04}", channel_id, slot),
                    title: format!("{} {}", title, slot % 9 + 1),
                    category: Some(CATEGORIES[(ci + slot) % CATEGORIES.len()].to_string()),
                    description: Some(format!("{title} on {name}.")),
                    start_time: format_instant(cursor),
                    end_time: format_instant(end),
                });
                cursor = end;
                slot += 1;
            }
            channels.push(ChannelDto {
                channel_id,
                display_name: (*name).to_string(),
                icon_ref: None,
                display_order: ci as u32,
                programs,
            });
        }
        Self { channels }
    }

    fn channels_in_window(&self, window: TimeWindow) -> Vec<ChannelDto> {
        self.channels
            .iter()
            .map(|c| {
                let programs = c
                    .programs
                    .iter()
                    .filter(|p| {
                        match (parse_instant(&p.start_time), parse_instant(&p.end_time)) {
                            (Some(start), Some(end)) => window.overlaps(start, end),
                            _ => false,
                        }
                    })
                    .cloned()
                    .collect();
                ChannelDto {
                    programs,
                    ..c.clone()
                }
            })
            .collect()
    }

    fn search(&self, query: &str) -> Vec<SearchResultDto> {
        let needle = query.to_lowercase();
        let mut hits = Vec::new();
        for c in &self.channels {
            let channel_match = c.display_name.to_lowercase().contains(&needle);
            for p in &c.programs {
                let match_type = if p.title.to_lowercase().contains(&needle) {
                    "title"
                } else if channel_match {
                    "channel"
                } else {
                    continue;
                };
                hits.push(SearchResultDto {
                    program_id: p.program_id.clone(),
                    channel_id: c.channel_id.clone(),
                    title: p.title.clone(),
                    channel_name: c.display_name.clone(),
                    category: p.category.clone(),
                    start_time: p.start_time.clone(),
                    end_time: p.end_time.clone(),
                    match_type: match_type.to_string(),
                });
            }
        }
        hits.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        hits.truncate(SEARCH_RESULT_CAP);
        hits
    }
}

impl GuideBackend for JsonFileBackend {
    fn fetch_channels_with_programs(
        &self,
        start_iso: String,
        end_iso: String,
    ) -> BoxFuture<'static, Result<Vec<ChannelDto>, FetchError>> {
        let result = match (parse_instant(&start_iso), parse_instant(&end_iso)) {
            (Some(start), Some(end)) if start < end => {
                Ok(self.channels_in_window(TimeWindow::new(start, end)))
            }
            _ => Err(FetchError::Failed(format!(
                "invalid window bounds: {start_iso}..{end_iso}"
            ))),
        };
        futures::future::ready(result).boxed()
    }

    fn search_programs(&self, query: String) -> BoxFuture<'static, Result<Vec<SearchResultDto>, FetchError>> {
        futures::future::ready(Ok(self.search(&query))).boxed()
    }

    fn fetch_program_by_id(&self, id: String) -> BoxFuture<'static, Result<ProgramDetailDto, FetchError>> {
        let found = self.channels.iter().find_map(|c| {
            c.programs.iter().find(|p| p.program_id == id).map(|p| ProgramDetailDto {
                channel_id: c.channel_id.clone(),
                channel_name: c.display_name.clone(),
                icon_ref: c.icon_ref.clone(),
                program: p.clone(),
            })
        });
        let result = found.ok_or_else(|| FetchError::Failed(format!("unknown program id: {id}")));
        futures::future::ready(result).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 22, h, mi, 0).unwrap()
    }

    fn dto(id: &str, start: &str, end: &str) -> ProgramDto {
        ProgramDto {
            program_id: id.to_string(),
            title: id.to_string(),
            category: None,
            description: None,
            start_time: start.to_string(),
            end_time: end.to_string(),
        }
    }

    #[test]
    fn malformed_interval_is_excluded_not_repaired() {
        let channels = channels_from_dtos(vec![ChannelDto {
            channel_id: "c1".into(),
            display_name: "One".into(),
            icon_ref: None,
            display_order: 0,
            programs: vec![
                dto("ok", "2026-01-22T18:00:00Z", "2026-01-22T18:30:00Z"),
                dto("backwards", "2026-01-22T19:00:00Z", "2026-01-22T18:30:00Z"),
                dto("garbled", "not-a-time", "2026-01-22T20:00:00Z"),
            ],
        }]);
        assert_eq!(channels[0].programs.len(), 1);
        assert_eq!(channels[0].programs[0].program_id, "ok");
    }

    #[test]
    fn channels_are_ordered_by_display_order() {
        let mk = |id: &str, order: u32| ChannelDto {
            channel_id: id.into(),
            display_name: id.into(),
            icon_ref: None,
            display_order: order,
            programs: vec![],
        };
        let channels = channels_from_dtos(vec![mk("b", 2), mk("a", 1), mk("c", 0)]);
        let ids: Vec<_> = channels.iter().map(|c| c.channel_id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn instants_round_trip_through_iso() {
        let instant = at(18, 30);
        assert_eq!(parse_instant(&format_instant(instant)), Some(instant));
    }

    #[tokio::test]
    async fn fixture_backend_serves_window_slices() {
        let backend = JsonFileBackend::sample(at(12, 0));
        let channels = backend
            .fetch_channels_with_programs(
                format_instant(at(12, 0)),
                format_instant(at(15, 0)),
            )
            .await
            .unwrap();
        assert_eq!(channels.len(), backend.channel_count());
        for c in &channels {
            assert!(!c.programs.is_empty(), "{} has no programs in window", c.channel_id);
            for p in &c.programs {
                let start = parse_instant(&p.start_time).unwrap();
                let end = parse_instant(&p.end_time).unwrap();
                assert!(end > at(12, 0) && start < at(15, 0));
            }
        }
    }

    #[tokio::test]
    async fn fixture_backend_searches_titles_and_channels() {
        let backend = JsonFileBackend::sample(at(12, 0));
        let hits = backend.search_programs("atlas".to_string()).await.unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.match_type == "channel"));
        assert!(hits.len() <= SEARCH_RESULT_CAP);

        let hits = backend.search_programs("quiz".to_string()).await.unwrap();
        assert!(hits.iter().all(|h| h.match_type == "title"));
    }

    #[tokio::test]
    async fn fixture_backend_resolves_program_ids() {
        let backend = JsonFileBackend::sample(at(12, 0));
        let detail = backend
            .fetch_program_by_id("ch-001-p0000".to_string())
            .await
            .unwrap();
        assert_eq!(detail.channel_id, "ch-001");
        assert!(detail_from_dto(&detail).is_some());

        let missing = backend.fetch_program_by_id("nope".to_string()).await;
        assert!(missing.is_err());
    }
}
