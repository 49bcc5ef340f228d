use chrono::{DateTime, Days, NaiveTime, Utc};
use rusqlite::params;
use serde::{Serialize, Serializer};

use super::{epoch_secs, new_id, Database, DbError};

const TOP_EMOTIONS: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_conversations: i64,
    pub active_conversations: i64,
    pub escalated_conversations: i64,
    pub avg_sentiment: f64,
    pub total_messages: i64,
    pub urgent_messages: i64,
    pub conversations_today: i64,
    /// Most frequent first, rendered as a JSON object in that order.
    #[serde(serialize_with = "ranked_counts")]
    pub top_emotions: Vec<(String, i64)>,
}

fn ranked_counts<S: Serializer>(counts: &[(String, i64)], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(counts.iter().map(|(k, v)| (k, v)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub date: String,
    pub conversations: i64,
}

fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

impl Database {
    pub fn record_event(
        &self,
        event_type: &str,
        data: &serde_json::Value,
        conversation_id: Option<&str>,
    ) -> Result<(), DbError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO analytics_events (id, event_type, event_data, conversation_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new_id(),
                event_type,
                data.to_string(),
                conversation_id,
                Utc::now().timestamp(),
            ],
        )?;
        Ok(())
    }

    #[cfg(test)]
    pub fn count_events(&self, event_type: &str) -> Result<i64, DbError> {
        let conn = self.conn.lock();
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM analytics_events WHERE event_type = ?1",
            params![event_type],
            |row| row.get(0),
        )?)
    }

    /// Dashboard counters as of `now`.
    pub fn analytics_summary(&self, now: DateTime<Utc>) -> Result<AnalyticsSummary, DbError> {
        let today = epoch_secs(start_of_day(now));
        let conn = self.conn.lock();

        let (total, active, escalated, avg, today_count): (i64, i64, i64, f64, i64) = conn
            .query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(status = 'active'), 0),
                        COALESCE(SUM(status = 'escalated'), 0),
                        COALESCE(AVG(sentiment_avg), 0.0),
                        COALESCE(SUM(started_at >= ?1), 0)
                 FROM conversations",
                params![today],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )?;

        let (total_messages, urgent_messages): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(is_urgent), 0) FROM messages",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = conn.prepare(
            "SELECT emotion, COUNT(*) AS n FROM messages
             WHERE emotion IS NOT NULL
             GROUP BY emotion ORDER BY n DESC, emotion LIMIT ?1",
        )?;
        let top_emotions = stmt
            .query_map(params![TOP_EMOTIONS], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, i64)>, _>>()?;

        Ok(AnalyticsSummary {
            total_conversations: total,
            active_conversations: active,
            escalated_conversations: escalated,
            avg_sentiment: (avg * 10_000.0).round() / 10_000.0,
            total_messages,
            urgent_messages,
            conversations_today: today_count,
            top_emotions,
        })
    }

    /// Conversations started per UTC day for the `days` days ending today, oldest first.
    pub fn conversation_timeline(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimelinePoint>, DbError> {
        let today = start_of_day(now);
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) FROM conversations WHERE started_at >= ?1 AND started_at < ?2",
        )?;

        let mut points = Vec::with_capacity(days as usize);
        for back in (0..days).rev() {
            let Some(day_start) = today.checked_sub_days(Days::new(u64::from(back))) else {
                continue;
            };
            let day_end = day_start + Days::new(1);
            let conversations: i64 = stmt.query_row(
                params![epoch_secs(day_start), epoch_secs(day_end)],
                |row| row.get(0),
            )?;
            points.push(TimelinePoint {
                date: day_start.format("%Y-%m-%d").to_string(),
                conversations,
            });
        }
        Ok(points)
    }
}
