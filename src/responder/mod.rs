//! Rule-based conversational fallback used when no live model is configured.
//!
//! [`Responder::respond`] lowercases the input and walks a fixed list of
//! stages (small talk, feelings, capitals, arithmetic, knowledge, support
//! topics, one-off intents, a topic extractor) returning the first hit, or a
//! random fallback line when nothing matches.

pub mod arith;
pub mod knowledge;
pub mod patterns;

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use arith::{BinOp, Expr};
use knowledge::{lookup, CAPITALS, CAPITAL_PROMPT, CAPITAL_WORD, KNOWLEDGE, SUPPORT};
use patterns::{Family, Feeling};

/// Which stage produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Greeting,
    HowAreYou,
    Thanks,
    Goodbye,
    Affirmative,
    Negative,
    Feeling(Feeling),
    Capital,
    Arithmetic,
    Knowledge(&'static str),
    Support(&'static str),
    Joke,
    Creator,
    Identity,
    Language,
    Weather,
    News,
    Calculator,
    Topic,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    fn new(kind: ReplyKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Two standalone numbers around one operator word, closing the message.
static WORD_ARITH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|[^\w.])(-?\d+(?:\.\d+)?)\s*\b(plus|minus|times|multiplied\s+by|x|divided\s+by|over|modulo|mod|to\s+the\s+power\s+of)\b\s*(-?\d+(?:\.\d+)?)\s*[?.!=]*\s*$",
    )
    .expect("built-in pattern must compile")
});

/// Text ending in an operator, so the matched pair is the tail of a chain.
static OPERATOR_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\b(?:plus|minus|times|by|x|over|modulo|mod|of)|[+\-*/%^])\s*$")
        .expect("built-in pattern must compile")
});

/// Dates and phone numbers: digit groups joined by bare hyphens.
static DIGIT_GROUPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(?:-\d+){2,}$|^\d{3,}-\d{4}$").expect("built-in pattern must compile")
});

static SYMBOL_ARITH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:what\s+is|what's|whats|calculate|compute|solve|evaluate|how\s+much\s+is)\s+)?([\d.()+\-*/%^\s]+?)\s*[=?]*\s*$",
    )
    .expect("built-in pattern must compile")
});

static HAS_OPERATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\d)]\s*[+\-*/%^]").expect("built-in pattern must compile")
});

static TOPIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:tell\s+me\s+about|what\s+is|what\s+are|who\s+is|who\s+was|explain|define|meaning\s+of)\b\s*(.*)$",
    )
    .expect("built-in pattern must compile")
});

static ARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:the|a|an)\s+").expect("built-in pattern must compile")
});

struct OneOff {
    kind: ReplyKind,
    matcher: Regex,
    replies: &'static [&'static str],
}

static ONE_OFFS: Lazy<Vec<OneOff>> = Lazy::new(|| {
    let table: &[(ReplyKind, &str, &'static [&'static str])] = &[
        (ReplyKind::Joke, r"\b(jokes?|funny|laugh)", patterns::JOKES),
        (
            ReplyKind::Creator,
            r"\bwho\s+(made|created|built)\s+you\b",
            &["I was built by a talented team of developers as an AI Voice Chatbot! I use natural language processing to understand and respond to you. Think of me as your friendly neighborhood AI assistant! 🤖✨"],
        ),
        (
            ReplyKind::Identity,
            r"\b(your\s+name|who\s+are\s+you|name)\b",
            &["I'm **VoiceBot AI**, your personal intelligent assistant! I can help with customer support, answer general knowledge questions, share fun facts, and have natural conversations. Nice to meet you! 🤖"],
        ),
        (
            ReplyKind::Language,
            r"\bhindi\b|हिंदी",
            &["हां, मैं हिंदी में बात कर सकता हूं! 😊 बताइए, मैं आपकी कैसे मदद कर सकता हूं? (Yes, I can chat in Hindi! How can I help you?)"],
        ),
        (
            ReplyKind::Weather,
            r"\bweather\b",
            &["I wish I could check the live weather for you! 🌤️ For accurate weather info, try a weather service or your phone's assistant. I'm better with knowledge questions, support, and conversations though!"],
        ),
        (
            ReplyKind::News,
            r"\b(news|latest|current\s+events|trending)\b",
            &["For the latest news, I'd recommend sources like Google News, BBC, or Reuters. I'm best at answering knowledge questions, helping with support, and having great conversations! 📰 Want to test my knowledge on any topic?"],
        ),
        (
            ReplyKind::Calculator,
            r"\b(calculat|math|equation|solve)",
            &["I can do quick sums! Try something like '15 plus 4' or '(2 + 3) * 4'. I also know about Pi, Fibonacci, and prime numbers. What would you like to work out? 🧮"],
        ),
    ];

    table
        .iter()
        .map(|(kind, pattern, replies)| OneOff {
            kind: *kind,
            matcher: Regex::new(pattern).expect("built-in pattern must compile"),
            replies: *replies,
        })
        .collect()
});

const TOPIC_TEMPLATE: &str = "That's a great question about **{topic}**! I don't have detailed notes on that yet, so for the most thorough and up-to-date information I'd suggest a resource like Wikipedia. In the meantime, ask me about science, technology, history, math, health, geography, or any support question! 📚";

const TOPIC_GENERIC: &str = "That's a great topic! For the most detailed and up-to-date information on a specific subject, a resource like Wikipedia is your best bet. In the meantime, ask me about science, technology, history, math, health, geography, or any support question! 📚";

/// Longest subject echoed back by the topic extractor.
const MAX_TOPIC_CHARS: usize = 60;

/// Keyword/regex responder. Stateless; all tables live in statics.
#[derive(Debug, Default, Clone, Copy)]
pub struct Responder;

impl Responder {
    pub fn new() -> Self {
        Self
    }

    /// Reply to `text`, where `turns` counts user turns including this one.
    pub fn respond(&self, text: &str, turns: usize) -> String {
        self.respond_with(text, turns, &mut rand::thread_rng())
    }

    pub fn respond_with<R: Rng + ?Sized>(&self, text: &str, turns: usize, rng: &mut R) -> String {
        self.reply(text, turns, rng).text
    }

    /// Like [`respond_with`](Self::respond_with), also reporting the stage that fired.
    pub fn reply<R: Rng + ?Sized>(&self, text: &str, turns: usize, rng: &mut R) -> Reply {
        let text = text.trim().to_lowercase();

        let small_talk: [(&Family, ReplyKind); 4] = [
            (&*patterns::GREETING, ReplyKind::Greeting),
            (&*patterns::HOW_ARE_YOU, ReplyKind::HowAreYou),
            (&*patterns::THANKS, ReplyKind::Thanks),
            (&*patterns::GOODBYE, ReplyKind::Goodbye),
        ];
        for (family, kind) in small_talk {
            if family.matches(&text) {
                return Reply::new(kind, pick(family.replies, rng));
            }
        }

        if turns > 1 {
            if patterns::AFFIRMATIVE.matches(&text) {
                return Reply::new(ReplyKind::Affirmative, pick(patterns::AFFIRMATIVE.replies, rng));
            }
            if patterns::NEGATIVE.matches(&text) {
                return Reply::new(ReplyKind::Negative, pick(patterns::NEGATIVE.replies, rng));
            }
        }

        if let Some(feeling) = match_feeling(&text) {
            return Reply::new(ReplyKind::Feeling(feeling), pick(feeling.replies(), rng));
        }

        if let Some(entry) = lookup(&CAPITALS, &text) {
            return Reply::new(ReplyKind::Capital, entry.answer.pick(rng));
        }
        if CAPITAL_WORD.is_match(&text) {
            return Reply::new(ReplyKind::Capital, CAPITAL_PROMPT);
        }

        if let Some(answer) = word_arithmetic(&text).or_else(|| symbol_arithmetic(&text)) {
            return Reply::new(ReplyKind::Arithmetic, answer);
        }

        if let Some(entry) = lookup(&KNOWLEDGE, &text) {
            return Reply::new(ReplyKind::Knowledge(entry.key), entry.answer.pick(rng));
        }

        if let Some(entry) = lookup(&SUPPORT, &text) {
            return Reply::new(ReplyKind::Support(entry.key), entry.answer.pick(rng));
        }

        if let Some(one_off) = ONE_OFFS.iter().find(|o| o.matcher.is_match(&text)) {
            return Reply::new(one_off.kind, pick(one_off.replies, rng));
        }

        if let Some(caps) = TOPIC.captures(&text) {
            let subject = caps.get(1).map(|m| clean_topic(m.as_str())).unwrap_or_default();
            let reply = if subject.is_empty() {
                TOPIC_GENERIC.to_string()
            } else {
                TOPIC_TEMPLATE.replace("{topic}", &subject)
            };
            return Reply::new(ReplyKind::Topic, reply);
        }

        Reply::new(ReplyKind::Fallback, pick(patterns::FALLBACK, rng))
    }
}

fn pick<R: Rng + ?Sized>(pool: &'static [&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn match_feeling(text: &str) -> Option<Feeling> {
    patterns::FEELINGS
        .iter()
        .chain(patterns::FEELING_KEYWORDS.iter())
        .find(|(_, regexes)| regexes.iter().any(|re| re.is_match(text)))
        .map(|(feeling, _)| *feeling)
}

/// `"15 plus 4"`: a single binary operation spelled out in words, ending the
/// message. Chains and numbers embedded in other words fall through.
fn word_arithmetic(text: &str) -> Option<String> {
    let caps = WORD_ARITH.captures(text)?;
    let lhs_start = caps.get(1)?.start();
    if OPERATOR_TAIL.is_match(&text[..lhs_start]) {
        return None;
    }
    let lhs: f64 = caps[1].parse().ok()?;
    let rhs: f64 = caps[3].parse().ok()?;
    let word = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");
    let op = match word.as_str() {
        "plus" => BinOp::Add,
        "minus" => BinOp::Sub,
        "times" | "multiplied by" | "x" => BinOp::Mul,
        "divided by" | "over" => BinOp::Div,
        "mod" | "modulo" => BinOp::Mod,
        "to the power of" => BinOp::Pow,
        _ => return None,
    };

    match Expr::binary(op, lhs, rhs).eval() {
        Ok(value) => Some(format!(
            "{} {} {} = **{}** 🧮",
            arith::format_number(lhs),
            op.symbol(),
            arith::format_number(rhs),
            arith::format_number(value)
        )),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping word-form arithmetic");
            None
        }
    }
}

/// `"what is 2 + 3 * 4"`: the whole message must be the expression, optionally
/// behind a question prefix.
fn symbol_arithmetic(text: &str) -> Option<String> {
    let caps = SYMBOL_ARITH.captures(text)?;
    let expr = caps.get(1)?.as_str().trim();
    if !HAS_OPERATOR.is_match(expr) || DIGIT_GROUPS.is_match(expr) {
        return None;
    }

    match arith::evaluate(expr) {
        Ok(value) => Some(format!("{expr} = **{}** 🧮", arith::format_number(value))),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping symbol-form arithmetic");
            None
        }
    }
}

fn clean_topic(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches(['?', '!', '.', ',']).trim();
    let subject = ARTICLE.replace(trimmed, "");
    subject.chars().take(MAX_TOPIC_CHARS).collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn reply(text: &str, turns: usize) -> Reply {
        Responder.reply(text, turns, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn greetings_draw_from_greeting_set() {
        for (seed, text) in ["hi", "Hello there", "good morning!", "hey"].iter().enumerate() {
            let mut rng = StdRng::seed_from_u64(seed as u64);
            let r = Responder.reply(text, 1, &mut rng);
            assert_eq!(r.kind, ReplyKind::Greeting, "{text}");
            assert!(patterns::GREETING_REPLIES.contains(&r.text.as_str()));
        }
    }

    #[test]
    fn greeting_needs_a_whole_word() {
        assert_ne!(reply("this is weird", 1).kind, ReplyKind::Greeting);
    }

    #[test]
    fn word_form_arithmetic() {
        let r = reply("what is 15 plus 4", 1);
        assert_eq!(r.kind, ReplyKind::Arithmetic);
        assert!(r.text.contains("19"), "{}", r.text);

        let r = reply("2 to the power of 10", 1);
        assert!(r.text.contains("1024"), "{}", r.text);

        let r = reply("7 divided by 2", 1);
        assert!(r.text.contains("3.5"), "{}", r.text);
    }

    #[test]
    fn symbol_form_arithmetic_uses_precedence() {
        let r = reply("what is 2+3*4?", 1);
        assert_eq!(r.kind, ReplyKind::Arithmetic);
        assert!(r.text.contains("**14**"), "{}", r.text);

        let r = reply("(2 + 3) * 4", 1);
        assert!(r.text.contains("**20**"), "{}", r.text);
    }

    #[test]
    fn division_by_zero_falls_through() {
        let r = reply("10 / 0", 1);
        assert_eq!(r.kind, ReplyKind::Fallback);

        let r = reply("10 divided by 0", 1);
        assert_ne!(r.kind, ReplyKind::Arithmetic);
    }

    #[test]
    fn word_operators_inside_sentences_fall_through() {
        assert_eq!(reply("where is my 2x4 order", 1).kind, ReplyKind::Support("order"));
        assert_eq!(
            reply("i ordered 2 times 3 days ago", 1).kind,
            ReplyKind::Support("order")
        );
    }

    #[test]
    fn chained_word_operations_are_not_half_evaluated() {
        let r = reply("what is 5 plus 3 plus 2", 1);
        assert_ne!(r.kind, ReplyKind::Arithmetic);
        assert!(!r.text.contains("**8**"), "{}", r.text);
        assert!(word_arithmetic("5 plus 3 + 2").is_none());
    }

    #[test]
    fn dates_and_phone_numbers_are_not_arithmetic() {
        assert_ne!(reply("2024-01-15", 1).kind, ReplyKind::Arithmetic);
        assert_ne!(reply("555-1234", 1).kind, ReplyKind::Arithmetic);
        assert!(reply("10-3", 1).text.contains("**7**"));
    }

    #[test]
    fn numbers_inside_sentences_are_not_evaluated() {
        let r = reply("my order 123-456 has not arrived", 1);
        assert_eq!(r.kind, ReplyKind::Support("order"));
    }

    #[test]
    fn capital_lookup_is_case_insensitive_and_whole_word() {
        let lower = reply("what is the capital of india", 1);
        let upper = reply("WHAT IS THE CAPITAL OF INDIA", 1);
        assert_eq!(lower.kind, ReplyKind::Capital);
        assert!(lower.text.contains("New Delhi"));
        assert_eq!(lower, upper);

        let r = reply("i grew up in indiana", 1);
        assert!(!r.text.contains("New Delhi"));
        assert_ne!(r.kind, ReplyKind::Capital);

        let r = reply("what is the capital", 1);
        assert_eq!(r.text, CAPITAL_PROMPT);
    }

    #[test]
    fn longer_knowledge_key_wins() {
        let r = reply("what is artificial intelligence", 1);
        assert_eq!(r.kind, ReplyKind::Knowledge("artificial intelligence"));

        let r = reply("explain ai to me", 1);
        assert_eq!(r.kind, ReplyKind::Knowledge("ai"));

        let r = reply("he said it was fine", 1);
        assert!(!matches!(r.kind, ReplyKind::Knowledge(_)));
    }

    #[test]
    fn feelings_outrank_knowledge() {
        let r = reply("i'm so sad, tell me about the moon", 1);
        assert_eq!(r.kind, ReplyKind::Feeling(Feeling::Sad));

        let r = reply("this is the worst, what is gravity", 1);
        assert_eq!(r.kind, ReplyKind::Feeling(Feeling::Frustrated));
    }

    #[test]
    fn same_input_same_category() {
        let inputs = [
            "hello",
            "i feel lonely",
            "tell me a fun fact",
            "where is my delivery",
            "tell me a joke",
            "asdf qwerty",
        ];
        for text in inputs {
            let a = Responder.reply(text, 3, &mut StdRng::seed_from_u64(1));
            let b = Responder.reply(text, 3, &mut StdRng::seed_from_u64(99));
            assert_eq!(a.kind, b.kind, "{text}");
        }
    }

    #[test]
    fn follow_ups_need_a_previous_turn() {
        assert_ne!(reply("yes please", 1).kind, ReplyKind::Affirmative);
        assert_eq!(reply("yes please", 2).kind, ReplyKind::Affirmative);
        assert_eq!(reply("nope", 2).kind, ReplyKind::Negative);
    }

    #[test]
    fn support_and_one_offs() {
        assert_eq!(
            reply("my delivery is late", 1).kind,
            ReplyKind::Support("deliver")
        );
        assert_eq!(reply("who made you", 1).kind, ReplyKind::Creator);
        assert_eq!(reply("what's your name", 1).kind, ReplyKind::Identity);
        assert_eq!(reply("can you speak hindi", 1).kind, ReplyKind::Language);
        assert_eq!(reply("how is the weather", 1).kind, ReplyKind::Weather);
    }

    #[test]
    fn topic_extractor_echoes_subject() {
        let r = reply("who was genghis khan?", 1);
        assert_eq!(r.kind, ReplyKind::Topic);
        assert!(r.text.contains("**genghis khan**"), "{}", r.text);
    }

    #[test]
    fn respond_never_returns_empty() {
        for text in ["", "   ", "???", "12345", "(((", "🤖"] {
            assert!(!Responder.respond(text, 1).is_empty(), "{text:?}");
        }
    }
}
