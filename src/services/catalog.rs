//! Read-only catalogues: reflective journal prompts and crisis-support
//! resources.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct JournalPrompt {
    pub id: &'static str,
    pub category: &'static str,
    pub prompt: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Crisis,
    Support,
    Emergency,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportResource {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub phone: &'static str,
    pub website: Option<&'static str>,
    pub availability: &'static str,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub region: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct PromptQuery {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub region: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<ResourceKind>,
}

pub const PROMPTS: &[JournalPrompt] = &[
    JournalPrompt {
        id: "gratitude",
        category: "Gratitude",
        prompt: "What are three things you're grateful for today, and why do they matter to you?",
        description: "Focus on appreciation and positive mindset",
    },
    JournalPrompt {
        id: "reflection",
        category: "Self-Reflection",
        prompt: "What emotion did you feel most strongly today? What triggered it, and how did you handle it?",
        description: "Explore your emotional landscape",
    },
    JournalPrompt {
        id: "growth",
        category: "Personal Growth",
        prompt: "What's one small step you took today toward becoming the person you want to be?",
        description: "Track your personal development",
    },
    JournalPrompt {
        id: "mindfulness",
        category: "Mindfulness",
        prompt: "Describe a moment today when you felt completely present. What were you doing, seeing, or feeling?",
        description: "Cultivate awareness and presence",
    },
    JournalPrompt {
        id: "relationships",
        category: "Relationships",
        prompt: "How did you connect with someone today? What did you learn about them or yourself?",
        description: "Strengthen your connections",
    },
    JournalPrompt {
        id: "challenges",
        category: "Challenges",
        prompt: "What challenge did you face today, and what strength did you discover in yourself while dealing with it?",
        description: "Build resilience and self-awareness",
    },
    JournalPrompt {
        id: "dreams",
        category: "Dreams & Goals",
        prompt: "What dream or goal felt a little closer today? What specific action brought you closer to it?",
        description: "Manifest your aspirations",
    },
    JournalPrompt {
        id: "self-care",
        category: "Self-Care",
        prompt: "How did you take care of yourself today? What does your body, mind, or soul need right now?",
        description: "Prioritize your wellbeing",
    },
];

const EMERGENCY: &str = "For immediate life-threatening emergencies.";

pub const RESOURCES: &[SupportResource] = &[
    SupportResource {
        id: "suicide-prevention",
        name: "National Suicide Prevention Lifeline",
        description: "Free and confidential emotional support for people in suicidal crisis or emotional distress.",
        phone: "988",
        website: Some("https://suicidepreventionlifeline.org"),
        availability: "24/7",
        kind: ResourceKind::Crisis,
        region: "US",
    },
    SupportResource {
        id: "crisis-text",
        name: "Crisis Text Line",
        description: "Free, 24/7 support for those in crisis. Text HOME to connect with a counselor.",
        phone: "741741",
        website: Some("https://crisistextline.org"),
        availability: "24/7",
        kind: ResourceKind::Crisis,
        region: "US",
    },
    SupportResource {
        id: "samaritans",
        name: "Samaritans",
        description: "Emotional support for anyone in emotional distress, struggling to cope, or at risk of suicide.",
        phone: "116 123",
        website: Some("https://samaritans.org"),
        availability: "24/7",
        kind: ResourceKind::Crisis,
        region: "UK",
    },
    SupportResource {
        id: "befrienders-kenya",
        name: "Befrienders Kenya",
        description: "Emotional support and suicide prevention services for anyone in distress.",
        phone: "+254 722 178 177",
        website: Some("https://www.facebook.com/BefriendersKenya"),
        availability: "24/7",
        kind: ResourceKind::Crisis,
        region: "Kenya",
    },
    SupportResource {
        id: "mental-health-kenya",
        name: "Mental Health Kenya",
        description: "Free mental health support and counseling services.",
        phone: "+254 20 3000378",
        website: Some("https://www.mentalhealthkenya.org"),
        availability: "Mon-Fri 8am-5pm",
        kind: ResourceKind::Support,
        region: "Kenya",
    },
    SupportResource {
        id: "inuka-coaches",
        name: "Inuka Coaches",
        description: "Professional counseling and mental health support services.",
        phone: "+254 701 163 050",
        website: Some("https://www.linkedin.com/company/inuka-coaches"),
        availability: "Mon-Fri 9am-6pm",
        kind: ResourceKind::Support,
        region: "Kenya",
    },
    SupportResource {
        id: "usikimye",
        name: "Usikimye",
        description: "Mental health awareness and support organization providing counseling services.",
        phone: "+254 794 814 738",
        website: Some("https://www.facebook.com/usikimyeke"),
        availability: "Mon-Fri 8am-5pm",
        kind: ResourceKind::Support,
        region: "Kenya",
    },
    SupportResource {
        id: "kapc-kenya",
        name: "Kenya Association of Professional Counsellors",
        description: "Professional counseling services and mental health support across Kenya.",
        phone: "+254 722 516 799",
        website: Some("https://kapc.or.ke"),
        availability: "Mon-Fri 8am-6pm",
        kind: ResourceKind::Support,
        region: "Kenya",
    },
    SupportResource {
        id: "nami",
        name: "NAMI Support",
        description: "National Alliance on Mental Illness provides support, education and advocacy.",
        phone: "1-800-950-6264",
        website: Some("https://nami.org"),
        availability: "Mon-Fri 10am-10pm ET",
        kind: ResourceKind::Support,
        region: "US",
    },
    SupportResource {
        id: "mind",
        name: "Mind UK",
        description: "Mental health charity providing advice and support to anyone experiencing mental health problems.",
        phone: "0300 123 3393",
        website: Some("https://mind.org.uk"),
        availability: "Mon-Fri 9am-6pm",
        kind: ResourceKind::Support,
        region: "UK",
    },
    SupportResource {
        id: "emergency-us",
        name: "Emergency Services",
        description: EMERGENCY,
        phone: "911",
        website: None,
        availability: "24/7",
        kind: ResourceKind::Emergency,
        region: "US",
    },
    SupportResource {
        id: "emergency-uk",
        name: "Emergency Services",
        description: EMERGENCY,
        phone: "999",
        website: None,
        availability: "24/7",
        kind: ResourceKind::Emergency,
        region: "UK",
    },
    SupportResource {
        id: "emergency-kenya",
        name: "Emergency Services",
        description: EMERGENCY,
        phone: "999 or 911",
        website: None,
        availability: "24/7",
        kind: ResourceKind::Emergency,
        region: "Kenya",
    },
    SupportResource {
        id: "kenya-police",
        name: "Kenya Police",
        description: "Police emergency services.",
        phone: "999 or 112",
        website: None,
        availability: "24/7",
        kind: ResourceKind::Emergency,
        region: "Kenya",
    },
];

/// Prompts whose id or category matches `category`, ignoring case.
pub fn prompts(category: Option<&str>) -> Vec<&'static JournalPrompt> {
    let wanted = category.map(str::trim).filter(|c| !c.is_empty());
    PROMPTS
        .iter()
        .filter(|p| {
            wanted.map_or(true, |c| {
                p.id.eq_ignore_ascii_case(c) || p.category.eq_ignore_ascii_case(c)
            })
        })
        .collect()
}

pub fn resources(query: &ResourceQuery) -> Vec<&'static SupportResource> {
    let region = query.region.as_deref().map(str::trim).filter(|r| !r.is_empty());
    RESOURCES
        .iter()
        .filter(|r| region.map_or(true, |want| r.region.eq_ignore_ascii_case(want)))
        .filter(|r| query.kind.map_or(true, |kind| r.kind == kind))
        .collect()
}
