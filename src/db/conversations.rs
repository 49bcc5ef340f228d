use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;

use super::{
    epoch_secs, from_epoch, new_id, Channel, Conversation, ConversationDetail, ConversationStatus,
    ConversationSummary, Database, DbError, Message, NewMessage,
};

const MAX_PAGE: i64 = 500;

/// Paging and status filter for conversation listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversationFilter {
    pub skip: i64,
    pub limit: i64,
    pub status: Option<ConversationStatus>,
}

impl Default for ConversationFilter {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 50,
            status: None,
        }
    }
}

const CONVERSATION_COLUMNS: &str =
    "c.id, c.user_id, c.channel, c.language, c.status, c.sentiment_avg, c.started_at, c.ended_at";

fn conversation_from_row(row: &Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        channel: row.get(2)?,
        language: row.get(3)?,
        status: row.get(4)?,
        sentiment_avg: row.get(5)?,
        started_at: from_epoch(row.get(6)?),
        ended_at: row.get::<_, Option<i64>>(7)?.map(from_epoch),
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        role: row.get(1)?,
        content: row.get(2)?,
        sentiment_score: row.get(3)?,
        emotion: row.get(4)?,
        is_urgent: row.get(5)?,
        created_at: from_epoch(row.get(6)?),
    })
}

impl Database {
    pub fn create_conversation(
        &self,
        user_id: Option<&str>,
        channel: Channel,
        language: &str,
    ) -> Result<Conversation, DbError> {
        let conversation = Conversation {
            id: new_id(),
            user_id: user_id.map(str::to_string),
            channel,
            language: language.to_string(),
            status: ConversationStatus::Active,
            sentiment_avg: 0.0,
            started_at: from_epoch(Utc::now().timestamp()),
            ended_at: None,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO conversations (id, user_id, channel, language, status, sentiment_avg, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                conversation.id,
                conversation.user_id,
                conversation.channel,
                conversation.language,
                conversation.status,
                conversation.sentiment_avg,
                epoch_secs(conversation.started_at),
            ],
        )?;
        Ok(conversation)
    }

    pub fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, DbError> {
        let conn = self.conn.lock();
        let found = conn
            .query_row(
                &format!("SELECT {CONVERSATION_COLUMNS} FROM conversations c WHERE c.id = ?1"),
                params![id],
                conversation_from_row,
            )
            .optional()?;
        Ok(found)
    }

    /// Conversation with its messages in creation order.
    pub fn conversation_detail(&self, id: &str) -> Result<Option<ConversationDetail>, DbError> {
        let Some(conversation) = self.get_conversation(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, role, content, sentiment_score, emotion, is_urgent, created_at
             FROM messages WHERE conversation_id = ?1
             ORDER BY created_at, rowid",
        )?;
        let messages = stmt
            .query_map(params![id], message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(ConversationDetail {
            conversation,
            messages,
        }))
    }

    /// Newest conversations first, each with its message count.
    pub fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> Result<Vec<ConversationSummary>, DbError> {
        let limit = filter.limit.clamp(0, MAX_PAGE);
        let skip = filter.skip.max(0);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CONVERSATION_COLUMNS},
                    (SELECT COUNT(*) FROM messages m WHERE m.conversation_id = c.id)
             FROM conversations c
             WHERE (?1 IS NULL OR c.status = ?1)
             ORDER BY c.started_at DESC, c.rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
            .query_map(params![filter.status, limit, skip], |row| {
                Ok(ConversationSummary {
                    conversation: conversation_from_row(row)?,
                    message_count: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete a conversation and, through the foreign key, its messages.
    pub fn delete_conversation(&self, id: &str) -> Result<(), DbError> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::NotFound("conversation"));
        }
        Ok(())
    }

    pub fn add_message(
        &self,
        conversation_id: &str,
        message: &NewMessage<'_>,
    ) -> Result<Message, DbError> {
        let stored = Message {
            id: new_id(),
            role: message.role.to_string(),
            content: message.content.to_string(),
            sentiment_score: message.sentiment_score,
            emotion: message.emotion.map(str::to_string),
            is_urgent: message.is_urgent,
            created_at: from_epoch(Utc::now().timestamp()),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO messages (id, conversation_id, role, content, sentiment_score, emotion, is_urgent, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                stored.id,
                conversation_id,
                stored.role,
                stored.content,
                stored.sentiment_score,
                stored.emotion,
                stored.is_urgent,
                epoch_secs(stored.created_at),
            ],
        )?;
        Ok(stored)
    }

    /// Recompute the running average of user-message sentiment. Returns the new average.
    pub fn refresh_sentiment_avg(&self, conversation_id: &str) -> Result<f64, DbError> {
        let conn = self.conn.lock();
        let avg: f64 = conn.query_row(
            "SELECT COALESCE(AVG(sentiment_score), 0.0) FROM messages
             WHERE conversation_id = ?1 AND role = 'user' AND sentiment_score IS NOT NULL",
            params![conversation_id],
            |row| row.get(0),
        )?;
        conn.execute(
            "UPDATE conversations SET sentiment_avg = ?1 WHERE id = ?2",
            params![avg, conversation_id],
        )?;
        Ok(avg)
    }

    /// Move a conversation to `status`, stamping `ended_at` unless it is active again.
    pub fn set_conversation_status(
        &self,
        id: &str,
        status: ConversationStatus,
    ) -> Result<Conversation, DbError> {
        {
            let conn = self.conn.lock();
            let ended_at = (status != ConversationStatus::Active).then(|| Utc::now().timestamp());
            let changed = conn.execute(
                "UPDATE conversations SET status = ?1, ended_at = ?2 WHERE id = ?3",
                params![status, ended_at, id],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound("conversation"));
            }
        }

        self.get_conversation(id)?
            .ok_or(DbError::NotFound("conversation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_message(content: &str, score: f64) -> NewMessage<'_> {
        NewMessage {
            role: "user",
            content,
            sentiment_score: Some(score),
            emotion: Some("neutral"),
            is_urgent: false,
        }
    }

    #[test]
    fn messages_cascade_with_conversation() {
        let db = Database::in_memory().unwrap();
        let conv = db.create_conversation(None, Channel::Web, "en").unwrap();
        db.add_message(&conv.id, &user_message("hi", 0.0)).unwrap();
        db.add_message(&conv.id, &NewMessage::plain("assistant", "hello"))
            .unwrap();

        let detail = db.conversation_detail(&conv.id).unwrap().unwrap();
        assert_eq!(detail.messages.len(), 2);
        assert_eq!(detail.messages[0].role, "user");

        db.delete_conversation(&conv.id).unwrap();
        assert!(db.conversation_detail(&conv.id).unwrap().is_none());
        let orphans: i64 = db
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM messages", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(matches!(
            db.delete_conversation(&conv.id),
            Err(DbError::NotFound(_))
        ));
    }

    #[test]
    fn sentiment_average_only_counts_user_messages() {
        let db = Database::in_memory().unwrap();
        let conv = db.create_conversation(None, Channel::Web, "en").unwrap();
        db.add_message(&conv.id, &user_message("a", 0.5)).unwrap();
        db.add_message(&conv.id, &user_message("b", -0.25)).unwrap();
        db.add_message(&conv.id, &NewMessage::plain("assistant", "c"))
            .unwrap();

        let avg = db.refresh_sentiment_avg(&conv.id).unwrap();
        assert!((avg - 0.125).abs() < 1e-9);
        let stored = db.get_conversation(&conv.id).unwrap().unwrap();
        assert!((stored.sentiment_avg - 0.125).abs() < 1e-9);
    }

    #[test]
    fn list_filters_and_pages() {
        let db = Database::in_memory().unwrap();
        let a = db.create_conversation(None, Channel::Web, "en").unwrap();
        let b = db.create_conversation(None, Channel::Phone, "hi").unwrap();
        db.add_message(&b.id, &user_message("x", 0.0)).unwrap();
        db.set_conversation_status(&a.id, ConversationStatus::Escalated)
            .unwrap();

        let all = db.list_conversations(&ConversationFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].conversation.id, b.id);
        assert_eq!(all[0].message_count, 1);

        let escalated = db
            .list_conversations(&ConversationFilter {
                status: Some(ConversationStatus::Escalated),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(escalated.len(), 1);
        assert_eq!(escalated[0].conversation.id, a.id);
        assert!(escalated[0].conversation.ended_at.is_some());

        let page = db
            .list_conversations(&ConversationFilter {
                skip: 1,
                limit: 1,
                status: None,
            })
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].conversation.id, a.id);
    }

    #[test]
    fn status_change_on_missing_conversation() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(
            db.set_conversation_status("nope", ConversationStatus::Closed),
            Err(DbError::NotFound("conversation"))
        ));
    }
}
