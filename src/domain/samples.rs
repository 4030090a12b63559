//! Built-in sample briefs for demos and dry runs.

use crate::domain::campaign::{BusinessType, CampaignInput};

struct SampleBrief {
    business_type: BusinessType,
    business: &'static str,
    product: &'static str,
    goal: &'static str,
    goal_value: &'static str,
    budget: &'static str,
    period: &'static str,
    persona: &'static str,
    competitors: &'static str,
    current_channels: &'static str,
    challenges: &'static str,
}

const SAMPLES: [SampleBrief; 3] = [
    SampleBrief {
        business_type: BusinessType::B2B,
        business: "クラウド型会計ソフトの開発・販売を行うSaaSスタートアップ",
        product: "中小企業向けに設計されたクラウド会計ソフト「MoneyFlow」。AIによる自動仕訳機能、リアルタイム銀行連携、カスタマイズ可能なレポート生成機能を搭載。月額9,800円からのサブスクリプションモデルで、導入後の経理業務を最大70%効率化。",
        goal: "lead",
        goal_value: "月間100件の無料トライアル申込",
        budget: "100-300万円",
        period: "6ヶ月",
        persona: "従業員10-50名の中小企業。主に経理担当者（30-50代女性）または経営者（40-60代男性）。現在はExcelや古い会計ソフトを使用しており、業務効率化に強い関心。ITリテラシーは中程度で、導入の手軽さを重視。",
        competitors: "弥生会計、freee、マネーフォワード",
        current_channels: "Google広告、展示会出展",
        challenges: "CPAが高く、認知度が低い。無料トライアルからの有料転換率を改善したい。",
    },
    SampleBrief {
        business_type: BusinessType::B2C,
        business: "オンラインフィットネスプログラムの提供",
        product: "自宅でできるパーソナライズされたフィットネスプログラム「FitHome」。AIが体型・目標・生活スタイルに合わせた最適なトレーニングメニューを自動生成。ライブレッスンとオンデマンド動画の両方を提供。月額2,980円から。",
        goal: "conversion",
        goal_value: "無料体験からの有料転換率30%",
        budget: "50-100万円",
        period: "3ヶ月",
        persona: "20-40代の働く女性。運動不足を感じているが、ジムに通う時間がない。健康意識が高く、SNSでの情報収集が活発。スマートフォンの利用頻度が高い。",
        competitors: "LEAN BODY、SOELU",
        current_channels: "Instagram広告、インフルエンサーマーケティング",
        challenges: "競合が多く差別化が難しい。継続率の向上が課題。",
    },
    SampleBrief {
        business_type: BusinessType::B2B,
        business: "BtoBマーケティング支援ツールの開発・販売",
        product: "リード獲得から商談化までを一元管理できるMAツール「LeadEngine」。Webサイト訪問者の行動分析、スコアリング、自動メール配信、セールス連携機能を搭載。導入企業の商談化率を平均2.5倍に改善。",
        goal: "lead",
        goal_value: "月間30件のデモ申込",
        budget: "300-500万円",
        period: "6ヶ月",
        persona: "IT企業・SaaS企業のマーケティング責任者（35-50代）。既存のMAツールに不満を感じている。データドリブンなアプローチを重視し、ROI証明を求める傾向。",
        competitors: "HubSpot、Marketo、Pardot",
        current_channels: "コンテンツマーケティング、ウェビナー、リスティング広告",
        challenges: "大手MAツールとの差別化。導入後のオンボーディング支援体制の構築。",
    },
];

/// Number of built-in samples.
pub fn sample_count() -> usize {
    SAMPLES.len()
}

/// Sample brief by index, wrapping around.
pub fn sample_brief(index: usize) -> CampaignInput {
    let sample = &SAMPLES[index % SAMPLES.len()];
    CampaignInput {
        business_type: sample.business_type,
        business: sample.business.to_string(),
        product: sample.product.to_string(),
        goal: sample.goal.to_string(),
        goal_value: sample.goal_value.to_string(),
        budget: sample.budget.to_string(),
        period: sample.period.to_string(),
        persona: sample.persona.to_string(),
        competitors: Some(sample.competitors.to_string()),
        current_channels: Some(sample.current_channels.to_string()),
        challenges: Some(sample.challenges.to_string()),
        competitor_urls: Vec::new(),
    }
}
