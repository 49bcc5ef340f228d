//! Fact tables: capitals, general knowledge and customer-support topics.

use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

/// A canned answer: either a single line or a pool to pick from.
#[derive(Debug, Clone, Copy)]
pub enum Answer {
    One(&'static str),
    Many(&'static [&'static str]),
}

impl Answer {
    pub fn pick<R: Rng + ?Sized>(self, rng: &mut R) -> &'static str {
        match self {
            Answer::One(text) => text,
            Answer::Many(pool) => pool.choose(rng).copied().unwrap_or_default(),
        }
    }
}

/// Keyword entry compiled into a matcher.
pub struct Entry {
    pub key: &'static str,
    matcher: Regex,
    pub answer: Answer,
}

impl Entry {
    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

/// Build matchers and order them longest key first. Ties keep table order.
fn build(table: &[(&'static str, Answer)], to_pattern: fn(&str) -> String) -> Vec<Entry> {
    let mut entries: Vec<Entry> = table
        .iter()
        .map(|(key, answer)| Entry {
            key: *key,
            matcher: Regex::new(&to_pattern(key)).expect("built-in keyword must compile"),
            answer: *answer,
        })
        .collect();
    entries.sort_by_key(|e| std::cmp::Reverse(e.key.chars().count()));
    entries
}

fn words(key: &str) -> String {
    key.split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Shortest key that still tolerates a plural suffix.
const MIN_PLURAL_KEY: usize = 4;

/// Whole word, tolerating a plural suffix on longer keys: "planets" hits
/// "planet", while "said" misses "ai" and "pies" misses "pi".
fn whole_word(key: &str) -> String {
    if key.chars().count() < MIN_PLURAL_KEY {
        format!(r"\b{}\b", words(key))
    } else {
        format!(r"\b{}(?:s|es)?\b", words(key))
    }
}

/// Word-start stem: "delivery" hits "deliver".
fn word_start(key: &str) -> String {
    format!(r"\b{}", words(key))
}

pub const CAPITAL_PROMPT: &str = "That's a great geography question! Could you specify which country you're asking about? I know capitals for most countries around the world! 🌍";

pub static CAPITAL_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bcapital\b").expect("built-in pattern must compile"));

pub static CAPITALS: Lazy<Vec<Entry>> = Lazy::new(|| {
    build(
        &[
            ("india", Answer::One("The capital of India is **New Delhi**. It's located in northern India and serves as the seat of the Indian government. Fun fact: New Delhi was designed by British architects Edwin Lutyens and Herbert Baker! 🏛️")),
            ("usa", Answer::One("The capital of the United States is **Washington, D.C.** It's named after George Washington, the first U.S. president. It's not part of any state! 🇺🇸")),
            ("united states", Answer::One("The capital of the United States is **Washington, D.C.** It's named after George Washington, the first U.S. president. It's not part of any state! 🇺🇸")),
            ("america", Answer::One("The capital of the United States is **Washington, D.C.** It's named after George Washington, the first U.S. president. It's not part of any state! 🇺🇸")),
            ("uk", Answer::One("The capital of the United Kingdom is **London**. It's one of the most visited cities in the world with landmarks like Big Ben, Buckingham Palace, and the Tower of London! 🇬🇧")),
            ("united kingdom", Answer::One("The capital of the United Kingdom is **London**. It's one of the most visited cities in the world with landmarks like Big Ben, Buckingham Palace, and the Tower of London! 🇬🇧")),
            ("england", Answer::One("The capital of England is **London**, which is also the capital of the whole United Kingdom. 🇬🇧")),
            ("france", Answer::One("The capital of France is **Paris**, the City of Light! Famous for the Eiffel Tower, the Louvre Museum, and amazing cuisine 🗼")),
            ("japan", Answer::One("The capital of Japan is **Tokyo**. It's the most populous metropolitan area in the world with over 37 million people! 🗾")),
            ("germany", Answer::One("The capital of Germany is **Berlin**. The Berlin Wall divided the city from 1961 until 1989! 🇩🇪")),
            ("italy", Answer::One("The capital of Italy is **Rome**, the Eternal City, home to the Colosseum and, inside it, Vatican City! 🇮🇹")),
            ("spain", Answer::One("The capital of Spain is **Madrid**, which sits almost exactly in the geographic center of the country. 🇪🇸")),
            ("portugal", Answer::One("The capital of Portugal is **Lisbon**, one of the oldest cities in Western Europe. 🇵🇹")),
            ("china", Answer::One("The capital of China is **Beijing**. It's home to the Forbidden City and Tiananmen Square! 🇨🇳")),
            ("russia", Answer::One("The capital of Russia is **Moscow**, famous for the Kremlin and Red Square. 🇷🇺")),
            ("canada", Answer::One("The capital of Canada is **Ottawa**, not Toronto as many people guess! 🇨🇦")),
            ("australia", Answer::One("The capital of Australia is **Canberra**. It was purpose-built as a compromise between Sydney and Melbourne! 🇦🇺")),
            ("brazil", Answer::One("The capital of Brazil is **Brasília**, a planned city inaugurated in 1960. 🇧🇷")),
            ("argentina", Answer::One("The capital of Argentina is **Buenos Aires**, the birthplace of the tango! 🇦🇷")),
            ("mexico", Answer::One("The capital of Mexico is **Mexico City**, built on the ruins of the Aztec city of Tenochtitlan. 🇲🇽")),
            ("egypt", Answer::One("The capital of Egypt is **Cairo**, just a short trip from the Great Pyramids of Giza! 🇪🇬")),
            ("south africa", Answer::One("South Africa has three capitals: **Pretoria** (executive), **Cape Town** (legislative) and **Bloemfontein** (judicial)! 🇿🇦")),
            ("nigeria", Answer::One("The capital of Nigeria is **Abuja**, which replaced Lagos in 1991. 🇳🇬")),
            ("kenya", Answer::One("The capital of Kenya is **Nairobi**, which even has a national park inside city limits! 🇰🇪")),
            ("pakistan", Answer::One("The capital of Pakistan is **Islamabad**, a planned city built in the 1960s. 🇵🇰")),
            ("bangladesh", Answer::One("The capital of Bangladesh is **Dhaka**, one of the most densely populated cities on Earth. 🇧🇩")),
            ("nepal", Answer::One("The capital of Nepal is **Kathmandu**, gateway to the Himalayas. 🇳🇵")),
            ("sri lanka", Answer::One("The commercial capital of Sri Lanka is **Colombo**, while the legislative capital is **Sri Jayawardenepura Kotte**. 🇱🇰")),
            ("south korea", Answer::One("The capital of South Korea is **Seoul**, a global hub for technology and K-pop! 🇰🇷")),
            ("north korea", Answer::One("The capital of North Korea is **Pyongyang**. 🇰🇵")),
            ("indonesia", Answer::One("The capital of Indonesia is **Jakarta**, though a new capital, Nusantara, is being built on Borneo. 🇮🇩")),
            ("thailand", Answer::One("The capital of Thailand is **Bangkok**, whose full ceremonial name is one of the longest place names in the world! 🇹🇭")),
            ("vietnam", Answer::One("The capital of Vietnam is **Hanoi**, a city more than 1,000 years old. 🇻🇳")),
            ("singapore", Answer::One("Singapore is a city-state, so its capital is **Singapore** itself! 🇸🇬")),
            ("uae", Answer::One("The capital of the United Arab Emirates is **Abu Dhabi**, not Dubai! 🇦🇪")),
            ("saudi arabia", Answer::One("The capital of Saudi Arabia is **Riyadh**. 🇸🇦")),
            ("iran", Answer::One("The capital of Iran is **Tehran**, sitting at the foot of the Alborz mountains. 🇮🇷")),
            ("netherlands", Answer::One("The capital of the Netherlands is **Amsterdam**, although the government sits in The Hague! 🇳🇱")),
            ("switzerland", Answer::One("Switzerland's federal city is **Bern**. Officially the country has no capital at all! 🇨🇭")),
            ("sweden", Answer::One("The capital of Sweden is **Stockholm**, built across 14 islands. 🇸🇪")),
            ("norway", Answer::One("The capital of Norway is **Oslo**. 🇳🇴")),
            ("new zealand", Answer::One("The capital of New Zealand is **Wellington**, the southernmost capital of a sovereign state. 🇳🇿")),
        ],
        whole_word,
    )
});

pub static KNOWLEDGE: Lazy<Vec<Entry>> = Lazy::new(|| {
    build(
        &[
            // General
            ("planet", Answer::One("Our solar system has **8 planets**: Mercury, Venus, Earth, Mars, Jupiter, Saturn, Uranus, and Neptune. Fun fact: Jupiter is so big that all other planets could fit inside it! 🪐")),
            ("sun", Answer::One("The Sun is a **G-type main-sequence star** at the center of our solar system. It's about 4.6 billion years old and accounts for 99.86% of the total mass of the solar system! The surface temperature is about 5,500°C ☀️")),
            ("moon", Answer::One("Earth's Moon is approximately **4.5 billion years old** and is about 384,400 km away from Earth. It's the fifth-largest moon in our solar system. Only 12 people have ever walked on it! 🌙")),
            ("earth", Answer::One("Earth is the **third planet** from the Sun and the only known planet to support life. It's about 4.54 billion years old, has a circumference of about 40,075 km, and is 71% covered in water! 🌍")),
            ("black hole", Answer::One("A **black hole** is a region of spacetime where gravity is so strong that nothing, not even light, can escape. The first image of one was captured in 2019 by the Event Horizon Telescope! 🕳️")),
            ("mount everest", Answer::One("**Mount Everest** is the highest mountain above sea level at about **8,849 meters**. It was first summited by Edmund Hillary and Tenzing Norgay in 1953! 🏔️")),
            // Technology
            ("ai", Answer::One("**AI** is short for artificial intelligence: systems that perform tasks that usually need human intelligence, like understanding speech, recognizing images and making decisions. I'm an example of AI in action! 🤖")),
            ("artificial intelligence", Answer::One("**Artificial Intelligence (AI)** is a branch of computer science focused on creating systems that can perform tasks that typically require human intelligence, like understanding speech, recognizing images, making decisions, and translating languages. The term was coined by John McCarthy in 1956! 🤖")),
            ("machine learning", Answer::One("**Machine Learning** is a subset of AI where computers learn from data without being explicitly programmed. Types include supervised, unsupervised, and reinforcement learning. It powers everything from recommendations to self-driving cars! 🧠")),
            ("deep learning", Answer::One("**Deep Learning** is machine learning with many-layered neural networks. It's behind modern speech recognition, image recognition and large language models! 🧠")),
            ("python", Answer::One("**Python** is one of the world's most popular programming languages! Created by Guido van Rossum in 1991, it's known for its clean, readable syntax and is widely used in AI, web development, data science, and automation. 🐍")),
            ("rust", Answer::One("**Rust** is a systems programming language focused on safety, speed and concurrency. It guarantees memory safety without a garbage collector, and first reached 1.0 in 2015! 🦀")),
            ("blockchain", Answer::One("**Blockchain** is a decentralized, distributed digital ledger. Each block contains transaction data and is cryptographically linked to the previous block. It's the technology behind cryptocurrencies like Bitcoin! ⛓️")),
            ("bitcoin", Answer::One("**Bitcoin** is the first decentralized cryptocurrency, introduced in 2009 by the pseudonymous Satoshi Nakamoto. Its supply is capped at 21 million coins! ₿")),
            ("chatgpt", Answer::One("**ChatGPT** is an AI chatbot developed by OpenAI, launched in November 2022. It uses large language models trained on vast amounts of text to generate human-like responses. 💬")),
            ("internet", Answer::One("The **Internet** is a global network of interconnected computers. It grew out of ARPANET in the late 1960s, and today over 5 billion people use it! 🌐")),
            ("cloud computing", Answer::One("**Cloud computing** means renting computing power, storage and services over the internet instead of owning the hardware. Big providers include AWS, Azure and Google Cloud! ☁️")),
            ("quantum computing", Answer::One("**Quantum computing** uses qubits, which can be in a superposition of 0 and 1, to attack certain problems far faster than classical computers. It's still an early, rapidly evolving field! ⚛️")),
            // Science
            ("gravity", Answer::One("**Gravity** is one of the four fundamental forces of nature. Described by Sir Isaac Newton (inspired by that famous falling apple 🍎), it attracts objects toward each other. Einstein later described it as the warping of spacetime!")),
            ("dna", Answer::One("**DNA (Deoxyribonucleic acid)** is the molecule that carries the genetic instructions for life. It's shaped like a double helix and contains four bases: Adenine, Thymine, Guanine, and Cytosine. 🧬")),
            ("water", Answer::One("**Water (H₂O)** is essential for all known forms of life and covers about 71% of Earth's surface. It's the only common substance that naturally exists as a solid, liquid, and gas! 💧")),
            ("light", Answer::One("**Light** travels at approximately **299,792 km/s**, the fastest speed in the universe! Sunlight takes about 8 minutes and 20 seconds to reach Earth. Light behaves both as a wave and a particle! 💡")),
            ("photosynthesis", Answer::One("**Photosynthesis** is how plants convert sunlight, water, and CO₂ into glucose and oxygen: 6CO₂ + 6H₂O + light → C₆H₁₂O₆ + 6O₂. It's how plants make their food and produce the oxygen we breathe! 🌱")),
            ("atom", Answer::One("An **atom** is the smallest unit of a chemical element: a nucleus of protons and neutrons surrounded by electrons. Atoms are mostly empty space! ⚛️")),
            ("electricity", Answer::One("**Electricity** is the flow of electric charge, usually electrons through a conductor. Benjamin Franklin's kite experiment in 1752 helped show that lightning is electrical! ⚡")),
            ("climate change", Answer::One("**Climate change** is the long-term shift in global temperatures and weather patterns, driven mainly by greenhouse gas emissions from burning fossil fuels. Earth has warmed about 1.1°C since pre-industrial times. 🌡️")),
            ("volcano", Answer::One("A **volcano** is an opening in Earth's crust where molten rock, ash and gases escape. There are about 1,350 potentially active volcanoes worldwide! 🌋")),
            ("dinosaur", Answer::One("**Dinosaurs** ruled Earth for about 165 million years and went extinct around 66 million years ago after an asteroid impact. Birds are their living descendants! 🦖")),
            // History
            ("world war", Answer::One("**World War I** (1914-1918) involved over 70 million military personnel. **World War II** (1939-1945) was the deadliest conflict in human history, with an estimated 70-85 million fatalities. 📚")),
            ("independence", Answer::One("India gained **independence on August 15, 1947** from British rule, after a long struggle led by Mahatma Gandhi, Jawaharlal Nehru, Subhas Chandra Bose, and many others. The USA declared independence on July 4, 1776! 🇮🇳")),
            ("gandhi", Answer::One("**Mahatma Gandhi** (1869-1948) led India's non-violent independence movement against British colonial rule, with campaigns like the Salt March. He's known as the 'Father of the Nation' in India. 🕊️")),
            ("einstein", Answer::One("**Albert Einstein** (1879-1955) developed the theory of relativity and the famous equation E = mc². He won the 1921 Nobel Prize in Physics for explaining the photoelectric effect! 🧠")),
            ("newton", Answer::One("**Sir Isaac Newton** (1643-1727) formulated the laws of motion and universal gravitation, and co-invented calculus! 🍎")),
            ("shakespeare", Answer::One("**William Shakespeare** (1564-1616) wrote about 39 plays and 154 sonnets, including Hamlet, Macbeth and Romeo and Juliet. He invented hundreds of English words! 🎭")),
            ("pyramid", Answer::One("The **Great Pyramid of Giza** was built around 2560 BC and was the tallest man-made structure on Earth for over 3,800 years! 🏜️")),
            // Math
            ("pi", Answer::One("**Pi (π)** is approximately **3.14159265358979...** It's the ratio of a circle's circumference to its diameter. Pi is irrational, so its decimals never end and never repeat! March 14 (3/14) is Pi Day 🥧")),
            ("fibonacci", Answer::One("The **Fibonacci sequence** is: 0, 1, 1, 2, 3, 5, 8, 13, 21, 34, 55, 89... Each number is the sum of the two preceding ones. It appears everywhere in nature, from flower petals to spiral galaxies! 🌻")),
            ("prime number", Answer::One("A **prime number** has exactly two divisors: 1 and itself. The first few are 2, 3, 5, 7, 11 and 13, and there are infinitely many of them! 🔢")),
            // Health
            ("vitamin", Answer::One("**Vitamins** are essential organic compounds your body needs. Key ones: A (vision), B complex (energy), C (immune system), D (bones, from sunlight!), E (antioxidant), K (blood clotting). A balanced diet usually provides all you need! 🍊")),
            ("exercise", Answer::One("Regular **exercise** is incredible for health! The WHO recommends at least 150 minutes of moderate exercise per week, for a healthier heart, better mood, stronger bones and better sleep! 💪")),
            ("sleep", Answer::One("Adults need **7-9 hours of sleep** per night. During sleep, your brain processes memories and your body repairs tissues. Poor sleep is linked to heart disease and reduced immune function. 😴")),
            ("heart", Answer::One("Your **heart** beats about 100,000 times a day, pumping around 7,500 liters of blood through roughly 100,000 km of blood vessels! ❤️")),
            ("brain", Answer::One("The human **brain** has about 86 billion neurons and uses roughly 20% of your body's energy despite being only 2% of its weight! 🧠")),
            // Fun
            ("fun fact", Answer::Many(&[
                "Here's a fun fact: **Honey never spoils!** Archaeologists have found 3,000-year-old honey in Egyptian tombs that was still perfectly edible. 🍯",
                "Fun fact: **octopuses have three hearts** and blue blood! 🐙",
                "Fun fact: **bananas are berries**, but strawberries aren't! 🍌",
            ])),
            ("random fact", Answer::Many(&[
                "Did you know? **The shortest war in history** lasted only 38 to 45 minutes, between Britain and Zanzibar on August 27, 1896. 🦩",
                "Did you know? A group of flamingos is called a **flamboyance**! 🦩",
            ])),
            ("space", Answer::One("**Space** is wild! The observable universe is about 93 billion light-years in diameter. There are more stars in the universe than grains of sand on all of Earth's beaches, and on Venus a day is longer than a year! 🚀")),
            ("ocean", Answer::One("The **ocean** covers 71% of Earth's surface but we've only explored about 5% of it! The deepest point is the Mariana Trench at about 11,034 meters. 🌊")),
            ("animal", Answer::One("The **animal kingdom** is fascinating! Blue whales are the largest animals ever, hummingbirds can fly backwards, and a group of crows is called a 'murder'. Nature is amazing! 🐋")),
        ],
        whole_word,
    )
});

pub static SUPPORT: Lazy<Vec<Entry>> = Lazy::new(|| {
    build(
        &[
            ("order", Answer::Many(&[
                "I'd love to help with your order! Could you share your order number? I'll track it down right away for you. 📦",
                "Sure thing! Let me look into your order. What's the order number or email you used?",
            ])),
            ("track", Answer::Many(&[
                "Happy to track that for you! Please share your order or tracking number. 🔎",
            ])),
            ("deliver", Answer::Many(&[
                "Let me check on your delivery! Most orders arrive in 3-5 business days. Could you share your order number for a precise update? 🚚",
                "I'll track your delivery right away! What's your order number?",
            ])),
            ("return", Answer::Many(&[
                "No worries, returns are easy! You can return within 30 days. Want me to start the process? Just share your order number. 📋",
                "I'm sorry it didn't work out! Our return process is simple. Share the order number and I'll get it started.",
            ])),
            ("exchange", Answer::Many(&[
                "Exchanges are free within 30 days of delivery! Which item would you like to swap, and for what? 🔄",
            ])),
            ("refund", Answer::Many(&[
                "Refunds typically process in 5-7 business days after we receive your return. Want me to check the status? 💳",
                "Let me look into your refund! What's your order number?",
            ])),
            ("damaged", Answer::Many(&[
                "I'm so sorry your item arrived damaged! Could you share a photo and your order number? I'll arrange a replacement or refund right away. 📸",
            ])),
            ("password", Answer::Many(&[
                "No worries, let's get you back in! I'll send a reset link to your email. Can you confirm the email on your account? 🔐",
                "Forgetting passwords happens to everyone! I'll help you reset it right away.",
            ])),
            ("login", Answer::Many(&[
                "Having trouble logging in? Try resetting your password first; if that doesn't work, tell me the error you see and I'll dig in. 🔑",
            ])),
            ("account", Answer::Many(&[
                "I can help with your account! Is this about your profile details, security settings, or something else? 👤",
            ])),
            ("cancel", Answer::Many(&[
                "I'm sorry to hear that! Before cancelling, is there anything I can do to help? If you've decided, I'll process it right away. 💔",
                "I understand. I'll process the cancellation. Is there anything we could have done differently?",
            ])),
            ("subscription", Answer::Many(&[
                "I can help you manage your subscription: upgrades, downgrades, pauses or renewals. What would you like to change? 🔁",
            ])),
            ("billing", Answer::Many(&[
                "Let me check your billing details! I can help with invoices, charges, and payment methods. What specifically do you need? 🧾",
            ])),
            ("invoice", Answer::Many(&[
                "I can resend any invoice to your registered email. Which billing period do you need? 🧾",
            ])),
            ("payment", Answer::Many(&[
                "Sorry about the payment trouble! Could you tell me whether the charge failed, was duplicated, or hasn't shown up yet? 💳",
                "Let me look into that payment. Checking your transaction history usually pinpoints the issue; what's the date and amount?",
            ])),
            ("shipping", Answer::Many(&[
                "We offer Standard (5-7 days, free over $50), Express (2-3 days), and Overnight shipping! Which would you like? 📬",
            ])),
            ("warranty", Answer::Many(&[
                "All products come with a 1-year limited warranty covering manufacturing defects. Want me to open a warranty claim? 🛡️",
            ])),
            ("discount", Answer::Many(&[
                "Great timing! New customers get 10% off their first order, and members get early access to seasonal sales. 🏷️",
            ])),
            ("complaint", Answer::Many(&[
                "I'm sorry you've had a bad experience. I'll log a formal complaint and make sure it reaches the right team. What happened? 📝",
            ])),
            ("manager", Answer::Many(&[
                "I'll connect you with a senior team member right away. Let me escalate this for you. 👔",
                "Of course, escalating to a manager now. They'll have full context of our conversation.",
            ])),
            ("hours", Answer::Many(&[
                "We're available **24/7**! Anytime, anywhere: phone, chat, or email. We never close! ⏰",
            ])),
            ("price", Answer::Many(&[
                "Our plans: Basic ($9.99/mo), Standard ($19.99/mo), and Premium ($29.99/mo). Want details on any? 💰",
            ])),
            ("upgrade", Answer::Many(&[
                "Upgrading is instant! Premium adds priority support and unlimited usage. Shall I walk you through it? ⬆️",
            ])),
        ],
        word_start,
    )
});

/// First matching entry in longest-key-first order.
pub fn lookup<'a>(entries: &'a [Entry], text: &str) -> Option<&'a Entry> {
    entries.iter().find(|e| e.matches(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_longest_first() {
        for table in [&*CAPITALS, &*KNOWLEDGE, &*SUPPORT] {
            let lengths: Vec<usize> = table.iter().map(|e| e.key.chars().count()).collect();
            assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn capital_match_is_whole_word() {
        assert_eq!(lookup(&CAPITALS, "capital of india").map(|e| e.key), Some("india"));
        assert!(lookup(&CAPITALS, "i live in indiana").is_none());
        assert_eq!(
            lookup(&CAPITALS, "what about south korea").map(|e| e.key),
            Some("south korea")
        );
    }

    #[test]
    fn knowledge_tolerates_plurals_but_not_substrings() {
        assert_eq!(lookup(&KNOWLEDGE, "list the planets").map(|e| e.key), Some("planet"));
        assert!(lookup(&KNOWLEDGE, "she said again").is_none());
        assert!(lookup(&KNOWLEDGE, "pizza tonight").is_none());
    }

    #[test]
    fn short_keys_take_no_plural_suffix() {
        assert!(lookup(&KNOWLEDGE, "i baked apple pies").is_none());
        assert_eq!(lookup(&KNOWLEDGE, "what is pi").map(|e| e.key), Some("pi"));
    }

    #[test]
    fn multi_word_key_outranks_its_substring() {
        let hit = lookup(&KNOWLEDGE, "tell me about artificial intelligence and ai");
        assert_eq!(hit.map(|e| e.key), Some("artificial intelligence"));
    }

    #[test]
    fn support_matches_word_stems() {
        assert_eq!(lookup(&SUPPORT, "my delivery is late").map(|e| e.key), Some("deliver"));
        assert_eq!(lookup(&SUPPORT, "i was refunded twice").map(|e| e.key), Some("refund"));
        assert!(lookup(&SUPPORT, "reorder").is_none());
    }
}
