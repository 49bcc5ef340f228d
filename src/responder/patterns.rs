//! Conversational regex families and their canned replies.

use once_cell::sync::Lazy;
use regex::Regex;

/// A group of trigger patterns sharing one reply pool.
pub struct Family {
    patterns: Vec<Regex>,
    pub replies: &'static [&'static str],
}

impl Family {
    fn new(patterns: &[&str], replies: &'static [&'static str]) -> Self {
        Self {
            patterns: compile(patterns),
            replies,
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

pub(crate) fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("built-in pattern must compile"))
        .collect()
}

pub static GREETING: Lazy<Family> = Lazy::new(|| {
    Family::new(
        &[
            r"\b(hi|hello|hey|hiya|howdy|yo|sup|hola|namaste|namaskar)\b",
            r"\bgood\s*(morning|afternoon|evening|night)\b",
            r"\bwhat'?s?\s*up\b",
        ],
        GREETING_REPLIES,
    )
});

pub const GREETING_REPLIES: &[&str] = &[
    "Hey there! 😊 I'm your AI assistant and I can help with anything: customer support, general knowledge, science, tech, history, you name it! What would you like to know?",
    "Hello! 👋 Welcome! I can answer questions, share interesting facts, help with orders, or just have a friendly chat. What's on your mind?",
    "Hi! Great to see you! I know about science, technology, history, geography, and much more. Plus I can help with any support issues. Fire away! 🚀",
];

pub static HOW_ARE_YOU: Lazy<Family> = Lazy::new(|| {
    Family::new(
        &[
            r"\bhow\s*(are|r)\s*(you|u|ya)\b",
            r"\bhow'?s?\s*it\s*going\b",
        ],
        &[
            "I'm doing great, thanks for asking! 😊 I've been reading up on everything from quantum physics to cooking recipes. What would you like to talk about?",
            "Fantastic! I love having conversations. I can chat about science, tech, history, or help you with anything you need. What are you curious about?",
        ],
    )
});

pub static THANKS: Lazy<Family> = Lazy::new(|| {
    Family::new(
        &[r"\b(thanks|thank\s*you|thx|tysm|appreciate)\b"],
        &[
            "You're so welcome! 😊 I love sharing knowledge. Is there anything else you're curious about?",
            "Happy to help! That's what I'm here for. Got any more questions? I never run out of answers! ✨",
        ],
    )
});

pub static GOODBYE: Lazy<Family> = Lazy::new(|| {
    Family::new(
        &[r"\b(bye|goodbye|see\s*ya|take\s*care|good\s*night|cya|later)\b"],
        &[
            "Goodbye! 👋 It was great chatting with you. Come back anytime, I'll be here 24/7!",
            "Take care! 😊 Remember, I'm always here if you want to learn something new or need help. See you soon!",
        ],
    )
});

pub static AFFIRMATIVE: Lazy<Family> = Lazy::new(|| {
    Family::new(
        &[r"\b(yes|yeah|yep|sure|okay|ok|please|go ahead|absolutely)\b"],
        &[
            "Perfect! Let me get that sorted for you right away... ✨ Done! Anything else I can help with?",
            "Great, I'm on it! All taken care of. What else would you like to know? 😊",
        ],
    )
});

pub static NEGATIVE: Lazy<Family> = Lazy::new(|| {
    Family::new(
        &[r"\b(no|nah|nope|nothing|that's all|all good|i'm good|im good)\b"],
        &[
            "No problem! If you ever want to learn something new or need help, I'm just a message away. Have a wonderful day! 😊",
            "Alright! Remember, I'm here 24/7 with answers about literally anything. Take care! ✨",
        ],
    )
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feeling {
    Sad,
    Lonely,
    Stressed,
    Anxious,
    Tired,
    Bored,
    Excited,
    Grateful,
    Confused,
    Scared,
    Heartbroken,
    Depressed,
    Overwhelmed,
    Motivated,
    Love,
    Miss,
    Frustrated,
    Angry,
    Happy,
}

impl Feeling {
    pub fn as_str(self) -> &'static str {
        match self {
            Feeling::Sad => "sad",
            Feeling::Lonely => "lonely",
            Feeling::Stressed => "stressed",
            Feeling::Anxious => "anxious",
            Feeling::Tired => "tired",
            Feeling::Bored => "bored",
            Feeling::Excited => "excited",
            Feeling::Grateful => "grateful",
            Feeling::Confused => "confused",
            Feeling::Scared => "scared",
            Feeling::Heartbroken => "heartbroken",
            Feeling::Depressed => "depressed",
            Feeling::Overwhelmed => "overwhelmed",
            Feeling::Motivated => "motivated",
            Feeling::Love => "love",
            Feeling::Miss => "miss",
            Feeling::Frustrated => "frustrated",
            Feeling::Angry => "angry",
            Feeling::Happy => "happy",
        }
    }

    pub fn replies(self) -> &'static [&'static str] {
        match self {
            Feeling::Frustrated => &[
                "I completely understand your frustration, and I'm really sorry. 😔 Let me take personal ownership of this. Tell me what happened and I'll fix it.",
                "I hear you, and your frustration is completely valid. Let me prioritize this and get it resolved right now.",
            ],
            Feeling::Angry => &[
                "I am so sorry about this experience. You have every right to be upset. Let me do everything I can to make this right immediately. 🙏",
            ],
            Feeling::Happy => &[
                "That's wonderful to hear! 🎉 Your happiness makes my day. Is there anything else I can help with?",
                "So glad to hear that! Positive vibes all around! ✨ What else can I do for you?",
            ],
            Feeling::Sad => &[
                "I'm really sorry you're feeling this way. 🫂 It's okay to feel sad sometimes; it shows you care deeply. Tough times don't last but tough people do. Want to talk about what's going on? I'm here to listen.",
                "Sending you a virtual hug. 💙 Sadness is a normal part of life, and it's brave of you to express it. Take things one step at a time. Is there something specific that's bothering you? Sometimes talking helps.",
            ],
            Feeling::Lonely => &[
                "I'm sorry you're feeling lonely. 💙 You're not alone, I'm right here with you. Loneliness can feel heavy, but it's temporary. Try reaching out to a friend, or even just stepping outside for a walk. You matter more than you know. Want to chat for a while?",
                "I hear you, and loneliness is tougher than most people realize. 🫂 Some of the strongest people feel lonely sometimes. I'm here 24/7 if you just want someone to talk to. No judgement, ever.",
            ],
            Feeling::Stressed => &[
                "I can feel the stress in your words, and it's okay to feel overwhelmed. 🌊 Take a deep breath: in for 4 seconds, hold for 4, out for 4. Stress is temporary, but your health is important. What's weighing on you?",
                "Stress can feel crushing, but you're stronger than you think. 💪 Quick tips: take 5 deep breaths, step away for 2 minutes, drink some water, and remind yourself you've survived 100% of your worst days so far. What's stressing you out?",
            ],
            Feeling::Anxious => &[
                "I understand anxiety can feel overwhelming. 🌟 Most of what we worry about never actually happens. Try grounding yourself: name 5 things you can see, 4 you can touch, 3 you can hear. You've got this!",
                "Anxiety is your brain trying to protect you, even when there's no real danger. 💙 Take slow, deep breaths. You're safe right now, in this moment. Would you like to talk about what's making you anxious?",
            ],
            Feeling::Tired => &[
                "It sounds like you need some rest, and that's perfectly okay! 😴 Your body is telling you something important. Even 10 minutes of rest can make a big difference. You've been working hard and you deserve it.",
                "Being tired is your body's way of saying 'slow down'. 🌙 Make sure you're drinking enough water, and try to get some quality sleep tonight. Rest is not laziness, it's recovery!",
            ],
            Feeling::Bored => &[
                "Bored? Let's fix that! 🎯 Ask me about space, tell me to share a fun fact, or test my knowledge on any topic! I can also tell jokes or discuss history. What sounds fun?",
                "I've got the cure for boredom! 🚀 Try asking me: 'Tell me a fun fact', 'What's fascinating about the ocean?', or 'Tell me a joke'. Or ask me any trivia question and see if I know the answer!",
            ],
            Feeling::Excited => &[
                "Your excitement is contagious! 🎉🥳 That's amazing energy! What's got you so pumped? I'd love to hear about it!",
                "YES! I love that energy! 🔥 Excitement is the best feeling. Tell me more, what's happening? I want to celebrate with you!",
            ],
            Feeling::Grateful => &[
                "That's so beautiful! 🥰 Gratitude is one of the most powerful emotions. Grateful people are happier, sleep better, and have stronger relationships. What are you grateful for today?",
                "Gratitude is truly special. 🌟 It takes strength to appreciate what you have. Thank you for sharing that with me!",
            ],
            Feeling::Confused => &[
                "It's totally okay to feel confused; it means you're thinking deeply about something! 🤔 Let's work through it together. What's confusing you?",
                "Confusion is just the first step to understanding! 💡 Everyone gets confused sometimes. Tell me what's puzzling you and let's figure it out together.",
            ],
            Feeling::Scared => &[
                "It's okay to feel scared; fear is a natural human emotion. 🫂 Courage isn't the absence of fear, it's acting despite it. What's scaring you? Maybe talking about it will help.",
                "I'm here with you. 💙 Being scared doesn't make you weak, it makes you human. Take a deep breath. Whatever you're facing, you don't have to face it alone.",
            ],
            Feeling::Heartbroken => &[
                "I'm so sorry you're going through heartbreak. 💔 It's one of the most painful feelings in the world, and it's okay to grieve. Time does heal, even though it doesn't feel like it right now. Be gentle with yourself.",
                "Heartbreak is incredibly tough. 🫂 Every ending is also a beginning. You will love again, and you will be loved. For now, feel your feelings; they're valid. I'm here for you.",
            ],
            Feeling::Depressed => &[
                "I hear you, and your feelings are valid. 💙 Depression is real and it's not your fault. Please consider reaching out to a mental health professional; they can truly help. In the meantime, try one small thing today: take a walk, drink water, or call someone you trust. You matter.",
                "I'm really glad you told me how you're feeling. 🫂 Depression can make everything feel hopeless, but there IS hope. It's okay to ask for help. Crisis helpline: **988** (US) or **iCall: 9152987821** (India). You're not alone in this.",
            ],
            Feeling::Overwhelmed => &[
                "Feeling overwhelmed is your mind's way of saying 'too much at once'. 🌊 Let's slow down. Focus on just ONE thing right now, the smallest, easiest task. Everything else can wait.",
                "I understand that overwhelming feeling. 💙 Write down everything on your mind, then circle just the top 3 priorities. The rest can wait. You're doing better than you think.",
            ],
            Feeling::Motivated => &[
                "That motivation is FIRE! 🔥💪 Channel that energy; you can achieve incredible things in this zone. What are you working on? I'd love to cheer you on!",
                "Love that energy! 🚀 Motivation plus action is unstoppable. Remember this feeling on the days when things get tough. Go crush it!",
            ],
            Feeling::Love => &[
                "Love is the most beautiful emotion! ❤️ Whether it's for a person, a passion, or life itself, it makes everything brighter. What's filling your heart with love today?",
                "Aww, that warms my heart! 🥰 Love makes the world go round. Cherish that feeling; it's one of life's greatest gifts.",
            ],
            Feeling::Miss => &[
                "Missing someone shows how much they mean to you. 💙 It's bittersweet: painful but also beautiful because it means you have deep connections. Maybe reach out to them? Even a simple 'thinking of you' message can mean the world.",
                "I understand that feeling of missing someone. 🫂 The people we miss have left an imprint on our hearts. Have you thought about reaching out? They might be missing you too.",
            ],
        }
    }
}

/// Feeling regexes in priority order; the first category with a hit wins.
pub static FEELINGS: Lazy<Vec<(Feeling, Vec<Regex>)>> = Lazy::new(|| {
    let table: &[(Feeling, &[&str])] = &[
        (
            Feeling::Sad,
            &[
                r"\b(sad|unhappy|crying|cry|tears|depressing|down|blue|miserable|heartache)\b",
                r"\bfeel(ing)?\s*(low|down|bad|empty|numb)\b",
            ],
        ),
        (
            Feeling::Lonely,
            &[
                r"\b(lonely|alone|isolated|nobody|no\s*one|no\s*friends)\b",
                r"\bfeel(ing)?\s*(lonely|alone|isolated)\b",
            ],
        ),
        (
            Feeling::Stressed,
            &[
                r"\b(stress|stressed|pressure|burnout|overwhelm|overwork)\b",
                r"\bunder\s*(pressure|stress)\b",
            ],
        ),
        (
            Feeling::Anxious,
            &[r"\b(anxious|anxiety|nervous|panic|worried|worrying|worry|fear|phobia)\b"],
        ),
        (
            Feeling::Tired,
            &[r"\b(tired|exhausted|drained|burned\s*out|fatigue|sleepy|worn\s*out|no\s*energy)\b"],
        ),
        (
            Feeling::Bored,
            &[r"\b(bored|boring|nothing\s*to\s*do|dull|monoton)\b"],
        ),
        (
            Feeling::Excited,
            &[r"\b(excited|thrilled|pumped|hyped|cant\s*wait|can't\s*wait|ecstatic|stoked)\b"],
        ),
        (
            Feeling::Grateful,
            &[r"\b(grateful|thankful|blessed|appreciate|gratitude)\b"],
        ),
        (
            Feeling::Confused,
            &[r"\b(confused|confusing|don't\s*understand|dont\s*understand|lost|puzzled|bewildered)\b"],
        ),
        (
            Feeling::Scared,
            &[r"\b(scared|afraid|terrified|frightened|fear|fearful|creep)\b"],
        ),
        (
            Feeling::Heartbroken,
            &[r"\b(heartbr|broken\s*heart|breakup|broke\s*up|dumped|cheated|betrayed)\b"],
        ),
        (
            Feeling::Depressed,
            &[r"\b(depress|hopeless|worthless|suicid|self\s*harm|don't\s*want\s*to\s*live|give\s*up|end\s*it)\b"],
        ),
        (
            Feeling::Overwhelmed,
            &[r"\b(overwhelm|too\s*much|can't\s*cope|cant\s*cope|drowning|swamped)\b"],
        ),
        (
            Feeling::Motivated,
            &[r"\b(motivat|inspired|determined|ready\s*to|gonna\s*do|going\s*to\s*do|pumped\s*up)\b"],
        ),
        (
            Feeling::Love,
            &[r"\b(in\s*love|i\s*love|loving|soulmate|crush)\b"],
        ),
        (
            Feeling::Miss,
            &[r"\b(miss\s*(you|her|him|them|my|someone)|missing\s*(someone|you|her|him))\b"],
        ),
    ];

    table
        .iter()
        .map(|(feeling, patterns)| (*feeling, compile(patterns)))
        .collect()
});

/// Keyword fallbacks checked after the feeling regexes.
pub static FEELING_KEYWORDS: Lazy<Vec<(Feeling, Vec<Regex>)>> = Lazy::new(|| {
    vec![
        (
            Feeling::Frustrated,
            compile(&[
                r"\bfrustrat",
                r"\b(annoying|terrible|worst|awful|horrible)\b",
            ]),
        ),
        (
            Feeling::Angry,
            compile(&[r"\b(angry|mad|furious|pissed)\b"]),
        ),
        (
            Feeling::Happy,
            compile(&[r"\b(happy|amazing|awesome)\b", r"\bgreat experience\b"]),
        ),
    ]
});

pub const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs! 🐛😂",
    "What did the AI say to the human? 'I think we need to have a deep learning conversation.' 🤖😄",
    "Why was the computer cold? It left its Windows open! 💻❄️",
    "How do trees access the internet? They log in! 🌳😁",
    "Why did the customer service bot break up with the calculator? It felt like it was always being counted on. 🧮💔",
];

pub const FALLBACK: &[&str] = &[
    "That's a great question! I'd love to dive deeper into that. Could you share a bit more detail so I can give you the best answer? 🤔",
    "Interesting! I have knowledge on tons of topics: science, tech, history, geography, health, and more. Could you be more specific about what you'd like to know?",
    "I'd love to help with that! Could you give me a few more details? I can answer questions about pretty much anything! 😊",
    "Great question! Let me think... Could you rephrase or add more context? I want to make sure I give you the perfect answer! 💡",
];
