//! Built-in complaint-handling prompts

use crate::types::{
    Field, PromptDefinition, PromptScript, PromptStep, ResolvedArguments, Schema, StepStyle,
};

/// Main complaint categories used by the backend
const CATEGORIES: &[&str] = &[
    "가격정보",
    "상품정보",
    "배송구매",
    "리뷰평점",
    "회원개인정보",
    "시스템기술",
];

pub fn prompt_definitions() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: "process-complaint".to_string(),
            title: "Complaint Processing Assistant".to_string(),
            description: "컴플레인 처리 프로세스를 단계별로 안내하고 분석합니다".to_string(),
            args_schema: Schema::new().field(
                Field::string("complaintId")
                    .required()
                    .describe("처리할 컴플레인의 ID"),
            ),
            references: refs(&[
                "fetch-complaint",
                "fetch-user-logs",
                "fetch-complaint-responses",
                "fetch-available-agents",
            ]),
            template: process_complaint,
        },
        PromptDefinition {
            name: "analyze-complaint-trend".to_string(),
            title: "Complaint Trend Analyzer".to_string(),
            description: "컴플레인 트렌드를 분석하고 인사이트를 제공합니다".to_string(),
            args_schema: Schema::new()
                .field(Field::string("category").describe("특정 카테고리 분석 (선택)"))
                .field(
                    Field::string("days")
                        .describe("분석할 일수 (기본: 7일)")
                        .with_default("7"),
                ),
            references: refs(&[
                "fetch-complaint-stats",
                "fetch-pending-complaints",
                "fetch-complaints-by-category",
            ]),
            template: analyze_complaint_trend,
        },
        PromptDefinition {
            name: "assign-complaint-to-agent".to_string(),
            title: "Complaint Assignment Assistant".to_string(),
            description: "컴플레인을 적절한 담당자에게 할당하는 것을 돕습니다".to_string(),
            args_schema: Schema::new().field(
                Field::string("complaintId")
                    .required()
                    .describe("할당할 컴플레인의 ID"),
            ),
            references: refs(&["fetch-complaint", "fetch-available-agents"]),
            template: assign_complaint_to_agent,
        },
    ]
}

fn refs(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn process_complaint(args: &ResolvedArguments) -> PromptScript {
    let id = args.get_str("complaintId").unwrap_or_default();
    PromptScript {
        intro: format!(
            "컴플레인 ID {}에 대한 처리를 도와주세요.\n\n다음 단계를 순차적으로 진행해주세요:",
            id
        ),
        style: StepStyle::Stage,
        steps: vec![
            PromptStep::new("컴플레인 상세 정보 조회")
                .call(
                    "fetch-complaint",
                    "fetch-complaint tool을 사용하여 컴플레인 전체 정보를 가져옵니다",
                )
                .line("티켓 번호, 고객 정보, 카테고리, 우선순위, 현재 상태를 확인합니다")
                .line("관련 상품/주문/판매자 정보가 있는지 확인합니다"),
            PromptStep::new("사용자 로그 확인")
                .call(
                    "fetch-user-logs",
                    "컴플레인에 연결된 userId가 있다면 fetch-user-logs tool을 사용하여 최근 활동을 확인합니다",
                )
                .line("사용자의 최근 행동 패턴을 파악합니다 (로그인, 주문, 문의 등)")
                .line("이전에도 유사한 문제가 있었는지 확인합니다"),
            PromptStep::new("처리 과정 확인")
                .call(
                    "fetch-complaint-responses",
                    "fetch-complaint-responses tool을 사용하여 현재까지의 응답 이력을 확인합니다",
                )
                .line("담당자가 할당되었는지, 언제 첫 응답이 있었는지 확인합니다")
                .line("에스컬레이션 레벨과 현재 진행 상태를 분석합니다")
                .line("SLA 준수 여부를 확인합니다 (첫 응답 24시간 이내)"),
            PromptStep::new("템플릿 확인 및 적용")
                .line("category와 subCategory를 기반으로 적절한 응답 템플릿이 있는지 확인합니다")
                .line("컴플레인 내용(subject, description)을 분석하여 가장 적합한 템플릿을 찾습니다")
                .line("템플릿이 있다면 고객에게 보낼 응답 초안을 작성합니다"),
            PromptStep::new("에스컬레이션 필요 여부 판단")
                .note("템플릿이 없거나 다음 조건에 해당하면 에스컬레이션이 필요합니다:")
                .line("priority가 'high'인 경우")
                .line("처리 시간이 오래 걸린 경우")
                .line("기술적 이슈가 복잡한 경우")
                .line("보상이 필요한 경우")
                .note("에스컬레이션이 필요하다면:")
                .call(
                    "fetch-available-agents",
                    "fetch-available-agents tool로 현재 업무 가능한 담당자를 확인합니다",
                )
                .line("적절한 팀과 담당자를 추천합니다")
                .line("JIRA 티켓 생성이 필요한지 판단합니다"),
            PromptStep::new("처리 권고사항 제시")
                .note("위 분석을 바탕으로:")
                .line("즉시 처리 가능한지, 에스컬레이션이 필요한지 판단")
                .line("예상 처리 시간")
                .line("고객에게 보낼 응답 초안")
                .line("필요한 보상 조치 (있다면)")
                .line("다음 액션 아이템"),
        ],
        closing: "각 단계의 결과를 명확하게 정리하여 보고해주세요.".to_string(),
    }
}

fn analyze_complaint_trend(args: &ResolvedArguments) -> PromptScript {
    let days = args.get_str("days").unwrap_or("7");
    let category = args.get_str("category").filter(|c| !c.is_empty());

    let filter = category
        .map(|category| format!(" (카테고리: {})", category))
        .unwrap_or_default();

    let category_step = match category {
        Some(category) => PromptStep::new("카테고리별 상세 분석").call(
            "fetch-complaints-by-category",
            format!(
                "fetch-complaints-by-category tool로 {} 카테고리의 컴플레인들을 분석합니다",
                category
            ),
        ),
        None => PromptStep::new("카테고리별 상세 분석").line(format!(
            "각 주요 카테고리({})별로 컴플레인 수를 확인합니다",
            CATEGORIES.join(", ")
        )),
    }
    .line("어떤 카테고리에 문제가 집중되어 있는지 파악합니다")
    .line("반복되는 이슈 패턴을 찾습니다");

    PromptScript {
        intro: format!(
            "최근 {}일간의 컴플레인 트렌드를 분석해주세요{}.\n\n## 분석 단계:",
            days, filter
        ),
        style: StepStyle::Numbered,
        steps: vec![
            PromptStep::new("전체 통계 확인")
                .call(
                    "fetch-complaint-stats",
                    "fetch-complaint-stats tool을 사용하여 전체 통계를 가져옵니다",
                )
                .line("총 컴플레인 수, 상태별 분포, 카테고리별 분포, 우선순위별 분포를 확인합니다"),
            PromptStep::new("미처리 컴플레인 분석")
                .call(
                    "fetch-pending-complaints",
                    "fetch-pending-complaints tool을 사용하여 미처리 컴플레인을 확인합니다",
                )
                .line("가장 오래된 미처리 건은 언제부터인지 확인합니다")
                .line("우선순위가 높은 미처리 건이 있는지 확인합니다"),
            category_step,
            PromptStep::new("처리 효율성 분석")
                .line("평균 응답 시간과 해결 시간을 계산합니다")
                .line("SLA 준수율을 확인합니다")
                .line("담당자별 처리 현황을 파악합니다 (가능한 경우)"),
            PromptStep::new("인사이트 및 권고사항")
                .note("분석 결과를 바탕으로:")
                .line("주요 문제점 3가지")
                .line("개선이 필요한 영역")
                .line("우선적으로 처리해야 할 항목")
                .line("프로세스 개선 제안"),
        ],
        closing: "각 분석 결과를 구체적인 수치와 함께 정리해주세요.".to_string(),
    }
}

fn assign_complaint_to_agent(args: &ResolvedArguments) -> PromptScript {
    let id = args.get_str("complaintId").unwrap_or_default();
    PromptScript {
        intro: format!(
            "컴플레인 ID {}를 적절한 담당자에게 할당하는 것을 도와주세요.\n\n## 할당 프로세스:",
            id
        ),
        style: StepStyle::Numbered,
        steps: vec![
            PromptStep::new("컴플레인 정보 확인")
                .call("fetch-complaint", "fetch-complaint tool로 컴플레인 정보를 가져옵니다")
                .line("category, subCategory, priority, urgency를 확인합니다")
                .line("기술적 이슈인지, 고객 응대 이슈인지 파악합니다"),
            PromptStep::new("현재 상태 확인")
                .line("이미 담당자가 할당되어 있는지 확인합니다")
                .line("할당되어 있다면 현재 진행 상태를 확인합니다")
                .line("재할당이 필요한 상황인지 판단합니다"),
            PromptStep::new("가용 담당자 조회")
                .call(
                    "fetch-available-agents",
                    "fetch-available-agents tool로 현재 업무 가능한 CS 담당자를 조회합니다",
                )
                .line("각 담당자의 현재 워크로드를 확인합니다")
                .line("specialties 정보를 확인하여 해당 카테고리 전문가를 찾습니다"),
            PromptStep::new("최적 담당자 추천")
                .note("다음 기준으로 담당자를 추천합니다:")
                .line("전문성: 해당 카테고리(category)에 대한 전문성이 있는가?")
                .line("가용성: 현재 워크로드가 적절한가?")
                .line("우선순위 처리 능력: priority가 high인 경우 시니어 담당자 우선")
                .line("평균 만족도: satisfaction_rating이 높은 담당자 우선"),
            PromptStep::new("할당 권고사항 제시")
                .line("추천 담당자 정보 (이름, 직급, 전문분야, 현재 워크로드)")
                .line("할당 이유")
                .line("예상 처리 시간")
                .line("특별히 주의해야 할 사항"),
        ],
        closing: "최종적으로 가장 적합한 담당자 1-3명을 순위별로 추천해주세요.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, &str)]) -> ResolvedArguments {
        let mut out = ResolvedArguments::new();
        for (k, v) in pairs {
            out.insert(*k, json!(v));
        }
        out
    }

    #[test]
    fn test_catalog_names() {
        let names: Vec<_> = prompt_definitions().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "process-complaint",
                "analyze-complaint-trend",
                "assign-complaint-to-agent"
            ]
        );
    }

    #[test]
    fn test_step_tools_are_declared_references() {
        for prompt in prompt_definitions() {
            let script = (prompt.template)(&args(&[("complaintId", "c-1"), ("category", "배송구매")]));
            for step in &script.steps {
                for tool in &step.tools {
                    assert!(prompt.references.contains(tool), "{} -> {}", prompt.name, tool);
                }
            }
        }
    }

    #[test]
    fn test_process_complaint_has_six_steps() {
        let script = process_complaint(&args(&[("complaintId", "c-42")]));
        assert_eq!(script.steps.len(), 6);
        assert!(script.intro.contains("c-42"));
    }

    #[test]
    fn test_trend_without_category_lists_all_categories() {
        let script = analyze_complaint_trend(&args(&[("days", "7")]));
        let category_step = &script.steps[2];
        assert!(category_step.tools.is_empty());
        assert!(category_step.lines[0].text().contains("시스템기술"));
    }

    #[test]
    fn test_process_complaint_text_layout() {
        let text = crate::prompts::join_script(&process_complaint(&args(&[("complaintId", "c-1")])));
        assert!(text.starts_with(
            "컴플레인 ID c-1에 대한 처리를 도와주세요.\n\n다음 단계를 순차적으로 진행해주세요:\n\n## 1단계: 컴플레인 상세 정보 조회\n- fetch-complaint tool을"
        ));
        assert!(text.contains(
            "## 5단계: 에스컬레이션 필요 여부 판단\n템플릿이 없거나 다음 조건에 해당하면 에스컬레이션이 필요합니다:\n- priority가 'high'인 경우"
        ));
        assert!(text.contains("- 보상이 필요한 경우\n\n에스컬레이션이 필요하다면:\n- fetch-available-agents tool로"));
        assert!(text.ends_with("- 다음 액션 아이템\n\n각 단계의 결과를 명확하게 정리하여 보고해주세요."));
    }

    #[test]
    fn test_assign_uses_numbered_headings() {
        let text =
            crate::prompts::join_script(&assign_complaint_to_agent(&args(&[("complaintId", "c-9")])));
        assert!(text.contains("## 할당 프로세스:\n\n### 1. 컴플레인 정보 확인\n- fetch-complaint tool로"));
        assert!(text.contains("### 4. 최적 담당자 추천\n다음 기준으로 담당자를 추천합니다:\n- 전문성"));
    }

    #[test]
    fn test_trend_intro_carries_category_filter() {
        let with = analyze_complaint_trend(&args(&[("days", "30"), ("category", "배송구매")]));
        assert!(with
            .intro
            .starts_with("최근 30일간의 컴플레인 트렌드를 분석해주세요 (카테고리: 배송구매)."));
        let without = analyze_complaint_trend(&args(&[("days", "7")]));
        assert!(without.intro.starts_with("최근 7일간의 컴플레인 트렌드를 분석해주세요."));
    }
}
