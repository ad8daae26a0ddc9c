//! Fixed per-intent responses.
//!
//! Every agent answers with the template for the classified intent. The
//! messages are Bengali because that is what the assistant speaks; the
//! `action` tag is the machine-readable part. Intents without a template of
//! their own get the general conversation template.

use serde_json::{json, Value};

use switchboard_contracts::{agent::AgentId, intent::Intent};

/// The response body for `intent`: `{ action, message, priority, suggestions }`.
pub fn response_template(intent: Intent) -> Value {
    match intent {
        Intent::SystemDiagnose => json!({
            "action": "system_diagnose",
            "message": "চলো সিস্টেমটা চেক করি। আমি এখনই সার্ভার স্ট্যাটাস, ডাটাবেজ কানেকশন, এবং প্রোভাইডার স্ট্যাটাস দেখছি।",
            "priority": "high",
            "suggestions": [
                "সার্ভার স্ট্যাটাস চেক করা",
                "ডাটাবেজ কানেকশন টেস্ট করা",
                "প্রোভাইডার হেলথ চেক করা",
                "লগ ফাইল এনালাইসিস করা"
            ]
        }),

        Intent::CodeReview => json!({
            "action": "code_review",
            "message": "কোড রিভিউ করার জন্য আমি প্রস্তুত। কোন ফাইলটা দেখতে চাও?",
            "priority": "medium",
            "suggestions": [
                "সিনট্যাক্স চেক করা",
                "বেস্ট প্রাক্টিস এনালাইসিস",
                "পারফরম্যান্স অপটিমাইজেশন",
                "সিকিউরিটি চেক করা"
            ]
        }),

        Intent::ImageToHtml => json!({
            "action": "image_to_html",
            "message": "বন্ধু, এই ডিজাইনটা HTML-এ রূপান্তর করছি। ইমেজ ফাইলটা দাও, আমি pixel-perfect HTML কোড তৈরি করে দিচ্ছি।",
            "priority": "medium",
            "suggestions": [
                "ইমেজ আপলোড করা",
                "রেসপন্সিভ ডিজাইন সেটিংস",
                "CSS ফ্রেমওয়ার্ক সিলেক্ট করা",
                "ইন্টারেক্টিভিটি যোগ করা"
            ]
        }),

        Intent::ProjectSuggestion => json!({
            "action": "project_suggestion",
            "message": "তোমার ZombieCoder প্রজেক্টে আমার পরামর্শ আছে। আমি দেখছি তুমি এখন Admin Panel UI এবং Provider Management নিয়ে কাজ করছো। চলো একসাথে পরিকল্পনা করি।",
            "priority": "medium",
            "suggestions": [
                "Admin Panel UI সম্পূর্ণ করা (90% complete)",
                "Provider Management System টেস্টিং",
                "API Gateway ডেভেলপমেন্ট",
                "Backend Servers ইন্টিগ্রেশন",
                "Database Schema অপটিমাইজেশন",
                "GitHub Push সমস্যা সমাধান"
            ]
        }),

        Intent::DatabaseAnalyze => json!({
            "action": "database_analyze",
            "message": "ডাটাবেজ এনালাইসিস করার জন্য আমি প্রস্তুত। কোন টেবিল বা কুয়েরি নিয়ে কাজ করছো?",
            "priority": "medium",
            "suggestions": [
                "টেবিল স্ট্রাকচার এনালাইসিস",
                "কুয়েরি পারফরম্যান্স চেক",
                "ইন্ডেক্স অপটিমাইজেশন",
                "ডাটা ইন্টিগ্রিটি চেক"
            ]
        }),

        Intent::ProviderManage => json!({
            "action": "provider_manage",
            "message": "প্রোভাইডার ম্যানেজমেন্টে সাহায্য করছি। কোন প্রোভাইডার নিয়ে কাজ করছো?",
            "priority": "medium",
            "suggestions": [
                "প্রোভাইডার স্ট্যাটাস চেক",
                "API কনফিগারেশন",
                "রেট লিমিট মনিটরিং",
                "ফলব্যাক সেটআপ"
            ]
        }),

        Intent::GeneralHelp | Intent::GeneralConversation => json!({
            "action": "general_conversation",
            "message": "কেমন আছো বন্ধু? আমি তোমার AI সহকারী। তুমি চাইলে আমাকে context দাও, আমি এখুনি তোমাকে সাহায্য করি।",
            "priority": "low",
            "suggestions": [
                "সিস্টেম স্ট্যাটাস চেক করা",
                "প্রজেক্ট প্রোগ্রেস রিভিউ",
                "নতুন ফিচার প্ল্যানিং",
                "টেকনিক্যাল সাপোর্ট"
            ]
        }),
    }
}

/// "Processed by agent X", attached to specialist responses.
pub fn processed_by(agent: &AgentId) -> String {
    format!("এজেন্ট {} দ্বারা প্রক্রিয়াকৃত", agent)
}
